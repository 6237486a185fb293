//! Applicant — the registered user progressing through recruitment.
//!
//! An applicant owns exactly one [`Profile`](crate::profile::Profile),
//! created atomically with it at registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authority level of an account. Admin gates review, payment listing,
/// and timeline mutation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  #[default]
  Applicant,
  Admin,
}

impl Role {
  pub fn is_admin(&self) -> bool { matches!(self, Self::Admin) }
}

/// A registered account. The password hash never leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
  pub applicant_id:  Uuid,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:          Role,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::RecruitStore::register_applicant`].
/// `applicant_id` and `created_at` are assigned by the store; the profile
/// row is created in the same transaction.
#[derive(Debug, Clone)]
pub struct Registration {
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
  pub full_name:     String,
  pub nim:           String,
}
