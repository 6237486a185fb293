//! The `PaymentGateway` trait — the external payment provider seam.
//!
//! The provider issues a hosted payment page per transaction and reports
//! the outcome asynchronously through its webhook; this trait covers only
//! the outbound half.

use std::future::Future;

/// Everything the provider needs to open a transaction.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
  pub order_id:       String,
  pub gross_amount:   i64,
  pub customer_name:  String,
  pub customer_email: String,
  pub customer_phone: Option<String>,
  /// Where the provider sends the customer after the payment flow.
  pub return_url:     String,
}

/// The provider's handle on a freshly created transaction.
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
  /// The provider's reference token.
  pub token:        String,
  /// Hosted payment page for the applicant.
  pub redirect_url: String,
}

/// Abstraction over the external payment provider.
pub trait PaymentGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn create_transaction(
    &self,
    request: TransactionRequest,
  ) -> impl Future<Output = Result<CreatedTransaction, Self::Error>> + Send + '_;
}
