//! Snap-style payment gateway client and webhook signature verification.
//!
//! The provider exposes a single "create transaction" endpoint that returns
//! a hosted payment page, then reports outcomes through its webhook. Every
//! webhook carries `sha512(order_id + status_code + gross_amount +
//! server_key)` as its signature; notifications failing that check are
//! dropped before any state change.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use oprec_core::{
  gateway::{CreatedTransaction, PaymentGateway, TransactionRequest},
  payment::WebhookNotification,
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha512};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("gateway rejected the transaction ({status}): {body}")]
  Rejected { status: u16, body: String },
}

/// HTTP client for the provider's transaction endpoint.
#[derive(Clone)]
pub struct SnapGateway {
  client:     reqwest::Client,
  base_url:   String,
  server_key: String,
}

impl SnapGateway {
  pub fn new(base_url: String, server_key: String) -> Self {
    Self { client: reqwest::Client::new(), base_url, server_key }
  }
}

#[derive(Deserialize)]
struct SnapResponse {
  token:        String,
  redirect_url: String,
}

impl PaymentGateway for SnapGateway {
  type Error = GatewayError;

  async fn create_transaction(
    &self,
    request: TransactionRequest,
  ) -> Result<CreatedTransaction, GatewayError> {
    // Server-key basic auth with an empty password, per the provider.
    let credentials = B64.encode(format!("{}:", self.server_key));

    let body = json!({
      "transaction_details": {
        "order_id":     request.order_id,
        "gross_amount": request.gross_amount,
      },
      "customer_details": {
        "first_name": request.customer_name,
        "email":      request.customer_email,
        "phone":      request.customer_phone,
      },
      "callbacks": {
        "finish": request.return_url,
      },
    });

    let response = self
      .client
      .post(format!("{}/snap/v1/transactions", self.base_url))
      .header(reqwest::header::AUTHORIZATION, format!("Basic {credentials}"))
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(GatewayError::Rejected { status: status.as_u16(), body });
    }

    let snap: SnapResponse = response.json().await?;
    Ok(CreatedTransaction {
      token:        snap.token,
      redirect_url: snap.redirect_url,
    })
  }
}

// ─── Webhook signature ───────────────────────────────────────────────────────

/// The signature the provider computes over a notification.
pub fn notification_signature(
  order_id:     &str,
  status_code:  &str,
  gross_amount: &str,
  server_key:   &str,
) -> String {
  let mut hasher = Sha512::new();
  hasher.update(order_id.as_bytes());
  hasher.update(status_code.as_bytes());
  hasher.update(gross_amount.as_bytes());
  hasher.update(server_key.as_bytes());
  hex::encode(hasher.finalize())
}

/// Check a notification's `signature_key` against our server key.
pub fn verify_signature(
  notification: &WebhookNotification,
  server_key:   &str,
) -> bool {
  let expected = notification_signature(
    &notification.order_id,
    &notification.status_code,
    &notification.gross_amount,
    server_key,
  );
  // Hex comparison; both sides are fixed length.
  expected == notification.signature_key.to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use oprec_core::payment::TransactionStatus;

  fn notification(signature_key: String) -> WebhookNotification {
    WebhookNotification {
      order_id: "OR-20260801-abc".into(),
      transaction_status: TransactionStatus::Settlement,
      fraud_status: None,
      status_code: "200".into(),
      gross_amount: "50000.00".into(),
      signature_key,
    }
  }

  #[test]
  fn matching_signature_verifies() {
    let sig =
      notification_signature("OR-20260801-abc", "200", "50000.00", "sk-test");
    assert!(verify_signature(&notification(sig), "sk-test"));
  }

  #[test]
  fn uppercase_signature_verifies() {
    let sig =
      notification_signature("OR-20260801-abc", "200", "50000.00", "sk-test")
        .to_uppercase();
    assert!(verify_signature(&notification(sig), "sk-test"));
  }

  #[test]
  fn wrong_key_or_amount_fails() {
    let sig =
      notification_signature("OR-20260801-abc", "200", "50000.00", "sk-test");
    assert!(!verify_signature(&notification(sig.clone()), "sk-other"));

    let mut n = notification(sig);
    n.gross_amount = "1.00".into();
    assert!(!verify_signature(&n, "sk-test"));
  }
}
