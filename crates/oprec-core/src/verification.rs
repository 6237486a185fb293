//! Document verification — the review gate between profile completion and
//! payment eligibility.
//!
//! Submissions form an append-mostly history per applicant; the current one
//! is the most recently created. A submission is editable only while it is
//! Pending: resubmitting merges new documents into the open row, and once
//! an admin has reviewed it the row is terminal. Recovery after rejection
//! is a fresh submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review status of a single submission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
  Pending,
  Approved,
  Rejected,
}

impl VerificationStatus {
  /// Only Pending rows may be reviewed or edited; Approved and Rejected
  /// are terminal.
  pub fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }
}

/// Verification stage as seen by the progress aggregator: the latest
/// submission's status, or NotStarted when no row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
  NotStarted,
  Pending,
  Approved,
  Rejected,
}

impl VerificationState {
  pub fn from_latest(latest: Option<VerificationStatus>) -> Self {
    match latest {
      None => Self::NotStarted,
      Some(VerificationStatus::Pending) => Self::Pending,
      Some(VerificationStatus::Approved) => Self::Approved,
      Some(VerificationStatus::Rejected) => Self::Rejected,
    }
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// The four document slots a submission can carry. Each kind uploads into
/// its own storage folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
  StudyPlan,
  FormalPhoto,
  FollowProof,
  ShareProof,
}

impl DocumentKind {
  pub fn folder(&self) -> &'static str {
    match self {
      Self::StudyPlan => "verifications/study-plan",
      Self::FormalPhoto => "verifications/photo",
      Self::FollowProof => "verifications/follow-proof",
      Self::ShareProof => "verifications/share-proof",
    }
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// One review cycle. `reviewed_by` / `reviewed_at` are set only on admin
/// action; `rejection_reason` only when rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id:    Uuid,
  pub applicant_id:     Uuid,
  pub study_plan_url:   Option<String>,
  pub formal_photo_url: Option<String>,
  pub follow_proof_url: Option<String>,
  pub share_proof_url:  Option<String>,
  /// Link to the applicant's public campaign post (social proof).
  pub social_link:      Option<String>,
  pub status:           VerificationStatus,
  pub rejection_reason: Option<String>,
  pub reviewed_by:      Option<Uuid>,
  pub reviewed_at:      Option<DateTime<Utc>>,
  pub created_at:       DateTime<Utc>,
}

/// Document fields supplied on submit. `None` fields keep the value already
/// on the open Pending row (if any); on a fresh row they stay empty.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
  pub study_plan_url:   Option<String>,
  pub formal_photo_url: Option<String>,
  pub follow_proof_url: Option<String>,
  pub share_proof_url:  Option<String>,
  pub social_link:      Option<String>,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// An admin's verdict on a Pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
  Approved,
  Rejected,
}

impl ReviewDecision {
  pub fn status(&self) -> VerificationStatus {
    match self {
      Self::Approved => VerificationStatus::Approved,
      Self::Rejected => VerificationStatus::Rejected,
    }
  }
}
