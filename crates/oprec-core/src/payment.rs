//! Payment — a single registration-fee transaction per applicant,
//! reconciled through the provider's asynchronous webhook.
//!
//! The webhook may be delivered more than once and out of order; the status
//! mapping is safe to reapply, and a monotonic guard keeps a stale
//! `pending` notification from regressing a settled payment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
}

/// Payment stage as seen by the progress aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
  NotStarted,
  Pending,
  Paid,
  Failed,
}

impl PaymentState {
  pub fn from_latest(latest: Option<PaymentStatus>) -> Self {
    match latest {
      None => Self::NotStarted,
      Some(PaymentStatus::Pending) => Self::Pending,
      Some(PaymentStatus::Paid) => Self::Paid,
      Some(PaymentStatus::Failed) => Self::Failed,
    }
  }
}

// ─── Payment row ─────────────────────────────────────────────────────────────

/// One transaction attempt, keyed by the externally visible order id (used
/// as the primary key so webhook lookups are a single fetch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
  pub order_id:           String,
  pub applicant_id:       Uuid,
  pub provider:           String,
  pub amount:             i64,
  pub status:             PaymentStatus,
  pub payment_url:        Option<String>,
  /// The provider's own reference token for this transaction.
  pub external_reference: Option<String>,
  pub paid_at:            Option<DateTime<Utc>>,
  pub created_at:         DateTime<Utc>,
}

/// Input to [`crate::store::RecruitStore::create_payment`].
#[derive(Debug, Clone)]
pub struct NewPayment {
  pub order_id:           String,
  pub applicant_id:       Uuid,
  pub provider:           String,
  pub amount:             i64,
  pub payment_url:        Option<String>,
  pub external_reference: Option<String>,
}

/// Generate a fresh order id: date prefix for operator legibility, full
/// UUID for uniqueness.
pub fn new_order_id(now: DateTime<Utc>) -> String {
  format!("OR-{}-{}", now.format("%Y%m%d"), Uuid::new_v4().simple())
}

// ─── Webhook notification ────────────────────────────────────────────────────

/// Provider transaction status values this backend understands. Anything
/// else fails to parse at the boundary rather than being silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Capture,
  Settlement,
  Cancel,
  Deny,
  Expire,
  Pending,
}

/// Provider fraud assessment accompanying a `capture` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
  Accept,
  Challenge,
  Deny,
}

/// The webhook payload. Unknown fields are rejected at the parse boundary.
///
/// `status_code`, `gross_amount`, and `signature_key` feed the provider
/// signature check performed at the HTTP layer before any state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookNotification {
  pub order_id:           String,
  pub transaction_status: TransactionStatus,
  pub fraud_status:       Option<FraudStatus>,
  pub status_code:        String,
  pub gross_amount:       String,
  pub signature_key:      String,
}

/// Map a notification onto the current status.
///
/// Reproduces the provider's reconciliation table exactly, with one
/// tightening: once Paid, only explicit cancel/deny/expire signals may
/// change the status. Applying the same notification twice yields the same
/// end state.
pub fn apply_notification(
  current:            PaymentStatus,
  transaction_status: TransactionStatus,
  fraud_status:       Option<FraudStatus>,
) -> PaymentStatus {
  if current == PaymentStatus::Paid
    && !matches!(
      transaction_status,
      TransactionStatus::Cancel
        | TransactionStatus::Deny
        | TransactionStatus::Expire
    )
  {
    return PaymentStatus::Paid;
  }

  match (transaction_status, fraud_status) {
    (TransactionStatus::Capture, Some(FraudStatus::Challenge)) => {
      PaymentStatus::Pending
    }
    (TransactionStatus::Capture, Some(FraudStatus::Accept)) => {
      PaymentStatus::Paid
    }
    // Capture with a deny/absent fraud status: leave as-is.
    (TransactionStatus::Capture, _) => current,
    (TransactionStatus::Settlement, _) => PaymentStatus::Paid,
    (
      TransactionStatus::Cancel
      | TransactionStatus::Deny
      | TransactionStatus::Expire,
      _,
    ) => PaymentStatus::Failed,
    (TransactionStatus::Pending, _) => PaymentStatus::Pending,
  }
}
