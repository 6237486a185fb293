//! The `RecruitStore` trait — the persistence seam.
//!
//! Implemented by storage backends (e.g. `oprec-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.
//!
//! Writes that encode workflow rules carry their guard in the store so the
//! rule holds even under concurrent requests: submissions merge only into
//! a Pending row, reviews apply only to Pending rows, and at most one
//! non-Failed payment can exist per applicant.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  applicant::{Applicant, Registration},
  hierarchy::{Department, Division, SubDivision},
  payment::{NewPayment, Payment, PaymentStatus},
  profile::{Profile, ProfileUpdate},
  timeline::{TimelineDraft, TimelineEvent, TimelinePatch},
  verification::{
    DocumentPatch, ReviewDecision, Submission, VerificationStatus,
  },
};

/// Abstraction over a recruitment store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecruitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Applicants ────────────────────────────────────────────────────────

  /// Create the applicant and their profile in a single atomic unit; a
  /// failure leaves neither row behind. Fails on duplicate email or nim.
  fn register_applicant(
    &self,
    input: Registration,
  ) -> impl Future<Output = Result<Applicant, Self::Error>> + Send + '_;

  fn applicant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Applicant>, Self::Error>> + Send + '_;

  fn applicant_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Applicant>, Self::Error>> + Send + 'a;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn profile(
    &self,
    applicant_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Look up a profile by its student number.
  fn profile_by_nim<'a>(
    &'a self,
    nim: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Merge `update` into the stored profile and return the new row.
  /// Hierarchy containment is validated by the caller against the merged
  /// triple before this is invoked.
  fn update_profile(
    &self,
    applicant_id: Uuid,
    update:       ProfileUpdate,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn set_avatar(
    &self,
    applicant_id: Uuid,
    avatar_url:   String,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Hierarchy catalog ─────────────────────────────────────────────────

  /// All departments, ordered by name ascending.
  fn departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Divisions under a department, ordered by name ascending.
  fn divisions(
    &self,
    department_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Division>, Self::Error>> + Send + '_;

  /// Sub-divisions under a division, ordered by name ascending.
  fn sub_divisions(
    &self,
    division_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SubDivision>, Self::Error>> + Send + '_;

  fn division(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Division>, Self::Error>> + Send + '_;

  fn sub_division(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SubDivision>, Self::Error>> + Send + '_;

  // ── Verification ──────────────────────────────────────────────────────

  /// The most recently created submission for an applicant, if any.
  fn latest_submission(
    &self,
    applicant_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  fn submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Upsert-while-Pending: merge `patch` into the applicant's open Pending
  /// submission, or create a fresh Pending row when none exists. Terminal
  /// rows are never touched.
  fn submit_documents(
    &self,
    applicant_id: Uuid,
    patch:        DocumentPatch,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Apply an admin verdict. Fails when the submission is missing or has
  /// already been reviewed (transitions only run from Pending).
  fn review_submission(
    &self,
    submission_id:    Uuid,
    admin_id:         Uuid,
    decision:         ReviewDecision,
    rejection_reason: Option<String>,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// All submissions, newest first, optionally filtered by status.
  fn submissions(
    &self,
    status: Option<VerificationStatus>,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  // ── Payments ──────────────────────────────────────────────────────────

  /// The most recently created payment for an applicant, if any.
  fn latest_payment(
    &self,
    applicant_id: Uuid,
  ) -> impl Future<Output = Result<Option<Payment>, Self::Error>> + Send + '_;

  /// The applicant's Pending or Paid payment, if one exists. The store
  /// guarantees at most one.
  fn active_payment(
    &self,
    applicant_id: Uuid,
  ) -> impl Future<Output = Result<Option<Payment>, Self::Error>> + Send + '_;

  /// Persist a new Pending payment. Fails if the applicant already has an
  /// active (Pending or Paid) payment — this is the backstop for the
  /// check-then-create race.
  fn create_payment(
    &self,
    input: NewPayment,
  ) -> impl Future<Output = Result<Payment, Self::Error>> + Send + '_;

  fn payment<'a>(
    &'a self,
    order_id: &'a str,
  ) -> impl Future<Output = Result<Option<Payment>, Self::Error>> + Send + 'a;

  /// Set the reconciled status for an order. `paid_at` is stored verbatim:
  /// the caller passes the settlement instant on Paid and `None` otherwise.
  /// Paid is sticky: a non-Failed write against a Paid row is a no-op that
  /// returns the stored row, so the settled state and its `paid_at` survive
  /// stale notifications even when callers race.
  fn set_payment_status<'a>(
    &'a self,
    order_id: &'a str,
    status:   PaymentStatus,
    paid_at:  Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Payment, Self::Error>> + Send + 'a;

  /// All payments, newest first.
  fn payments(
    &self,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;

  // ── Timeline ──────────────────────────────────────────────────────────

  /// All timeline events, ordered by order index ascending.
  fn timeline(
    &self,
  ) -> impl Future<Output = Result<Vec<TimelineEvent>, Self::Error>> + Send + '_;

  fn timeline_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<TimelineEvent>, Self::Error>> + Send + '_;

  fn create_timeline_event(
    &self,
    draft: TimelineDraft,
  ) -> impl Future<Output = Result<TimelineEvent, Self::Error>> + Send + '_;

  fn update_timeline_event(
    &self,
    id:    Uuid,
    patch: TimelinePatch,
  ) -> impl Future<Output = Result<TimelineEvent, Self::Error>> + Send + '_;

  fn delete_timeline_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
