//! Error type for `oprec-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] oprec_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown enum value: {0}")]
  UnknownValue(String),

  #[error("email is already registered: {0}")]
  EmailTaken(String),

  #[error("nim is already registered: {0}")]
  NimTaken(String),

  #[error("profile not found for applicant {0}")]
  ProfileNotFound(Uuid),

  #[error("submission not found: {0}")]
  SubmissionNotFound(Uuid),

  /// Review attempted on a row that already left Pending.
  #[error("submission {0} has already been reviewed")]
  AlreadyReviewed(Uuid),

  #[error("payment not found: {0}")]
  PaymentNotFound(String),

  /// Insert attempted while a Pending or Paid payment already exists.
  #[error("applicant {0} already has an active payment")]
  ActivePaymentExists(Uuid),

  #[error("timeline event not found: {0}")]
  EventNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
