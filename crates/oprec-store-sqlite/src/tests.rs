//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use oprec_core::{
  applicant::{Registration, Role},
  payment::{new_order_id, NewPayment, PaymentStatus},
  profile::ProfileUpdate,
  store::RecruitStore,
  timeline::{TimelineDraft, TimelinePatch},
  verification::{DocumentPatch, ReviewDecision, VerificationStatus},
};
use uuid::Uuid;

use crate::{seed::seed_hierarchy, Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn registration(email: &str, nim: &str) -> Registration {
  Registration {
    email:         email.into(),
    password_hash: "$argon2id$fake".into(),
    role:          Role::Applicant,
    full_name:     "Alice Liddell".into(),
    nim:           nim.into(),
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_creates_applicant_and_profile() {
  let s = store().await;

  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();
  assert_eq!(applicant.email, "alice@example.com");
  assert_eq!(applicant.role, Role::Applicant);

  let profile = s.profile(applicant.applicant_id).await.unwrap().unwrap();
  assert_eq!(profile.full_name, "Alice Liddell");
  assert_eq!(profile.nim, "24060122001");
  assert!(!profile.is_complete());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
  let s = store().await;
  s.register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let err = s
    .register_applicant(registration("alice@example.com", "24060122002"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(e) if e == "alice@example.com"));
}

#[tokio::test]
async fn register_rejects_duplicate_nim() {
  let s = store().await;
  s.register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let err = s
    .register_applicant(registration("bob@example.com", "24060122001"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NimTaken(n) if n == "24060122001"));
}

#[tokio::test]
async fn applicant_lookup_by_email() {
  let s = store().await;
  let created = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let found = s.applicant_by_email("alice@example.com").await.unwrap();
  assert_eq!(found.unwrap().applicant_id, created.applicant_id);

  assert!(s.applicant_by_email("nobody@example.com").await.unwrap().is_none());
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_profile_merges_partial_fields() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let updated = s
    .update_profile(applicant.applicant_id, ProfileUpdate {
      nickname: Some("Ali".into()),
      whatsapp_number: Some("+628123456789".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.nickname.as_deref(), Some("Ali"));

  // A later update leaves earlier fields alone.
  let updated = s
    .update_profile(applicant.applicant_id, ProfileUpdate {
      study_program: Some("Informatics".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.nickname.as_deref(), Some("Ali"));
  assert_eq!(updated.whatsapp_number.as_deref(), Some("+628123456789"));
  assert_eq!(updated.study_program.as_deref(), Some("Informatics"));
}

#[tokio::test]
async fn update_profile_missing_applicant() {
  let s = store().await;
  let err = s
    .update_profile(Uuid::new_v4(), ProfileUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProfileNotFound(_)));
}

#[tokio::test]
async fn set_avatar_persists_url() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let profile = s
    .set_avatar(applicant.applicant_id, "/uploads/avatars/a.png".into())
    .await
    .unwrap();
  assert_eq!(profile.avatar_url.as_deref(), Some("/uploads/avatars/a.png"));
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_hierarchy_is_idempotent() {
  let s = store().await;
  seed_hierarchy(&s).await.unwrap();
  let first = s.departments().await.unwrap();
  assert!(!first.is_empty());

  seed_hierarchy(&s).await.unwrap();
  let second = s.departments().await.unwrap();
  assert_eq!(first.len(), second.len());
}

#[tokio::test]
async fn hierarchy_listings_are_scoped_and_sorted() {
  let s = store().await;
  seed_hierarchy(&s).await.unwrap();

  let departments = s.departments().await.unwrap();
  let names: Vec<_> = departments.iter().map(|d| d.name.clone()).collect();
  let mut sorted = names.clone();
  sorted.sort();
  assert_eq!(names, sorted);

  for department in &departments {
    let divisions = s.divisions(department.department_id).await.unwrap();
    assert!(divisions
      .iter()
      .all(|d| d.department_id == department.department_id));

    for division in &divisions {
      let subs = s.sub_divisions(division.division_id).await.unwrap();
      assert!(subs.iter().all(|sd| sd.division_id == division.division_id));
    }
  }
}

#[tokio::test]
async fn division_lookup_by_id() {
  let s = store().await;
  seed_hierarchy(&s).await.unwrap();

  let department = &s.departments().await.unwrap()[0];
  let division = &s.divisions(department.department_id).await.unwrap()[0];

  let found = s.division(division.division_id).await.unwrap().unwrap();
  assert_eq!(found.name, division.name);
  assert!(s.division(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Verification ────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_documents_creates_pending_submission() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let submission = s
    .submit_documents(applicant.applicant_id, DocumentPatch {
      study_plan_url: Some("/uploads/verifications/study-plan/a.pdf".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(submission.status, VerificationStatus::Pending);
  assert!(submission.formal_photo_url.is_none());
}

#[tokio::test]
async fn resubmit_while_pending_merges_into_same_row() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let first = s
    .submit_documents(applicant.applicant_id, DocumentPatch {
      study_plan_url: Some("/uploads/verifications/study-plan/a.pdf".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  let second = s
    .submit_documents(applicant.applicant_id, DocumentPatch {
      formal_photo_url: Some("/uploads/verifications/formal-photo/b.png".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(first.submission_id, second.submission_id);
  assert_eq!(
    second.study_plan_url.as_deref(),
    Some("/uploads/verifications/study-plan/a.pdf")
  );
  assert_eq!(
    second.formal_photo_url.as_deref(),
    Some("/uploads/verifications/formal-photo/b.png")
  );
}

#[tokio::test]
async fn submit_after_rejection_opens_a_fresh_submission() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();
  let admin = s
    .register_applicant(Registration {
      role: Role::Admin,
      ..registration("admin@example.com", "24060122999")
    })
    .await
    .unwrap();

  let first = s
    .submit_documents(applicant.applicant_id, DocumentPatch::default())
    .await
    .unwrap();
  s.review_submission(
    first.submission_id,
    admin.applicant_id,
    ReviewDecision::Rejected,
    Some("photo is blurry".into()),
  )
  .await
  .unwrap();

  let second = s
    .submit_documents(applicant.applicant_id, DocumentPatch::default())
    .await
    .unwrap();
  assert_ne!(first.submission_id, second.submission_id);
  assert_eq!(second.status, VerificationStatus::Pending);

  let latest = s
    .latest_submission(applicant.applicant_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(latest.submission_id, second.submission_id);
}

#[tokio::test]
async fn review_records_decision_and_reviewer() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();
  let admin = s
    .register_applicant(Registration {
      role: Role::Admin,
      ..registration("admin@example.com", "24060122999")
    })
    .await
    .unwrap();

  let submission = s
    .submit_documents(applicant.applicant_id, DocumentPatch::default())
    .await
    .unwrap();

  let reviewed = s
    .review_submission(
      submission.submission_id,
      admin.applicant_id,
      ReviewDecision::Approved,
      // Ignored on approval.
      Some("should be dropped".into()),
    )
    .await
    .unwrap();
  assert_eq!(reviewed.status, VerificationStatus::Approved);
  assert_eq!(reviewed.reviewed_by, Some(admin.applicant_id));
  assert!(reviewed.reviewed_at.is_some());
  assert!(reviewed.rejection_reason.is_none());
}

#[tokio::test]
async fn review_is_final() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();
  let admin = s
    .register_applicant(Registration {
      role: Role::Admin,
      ..registration("admin@example.com", "24060122999")
    })
    .await
    .unwrap();

  let submission = s
    .submit_documents(applicant.applicant_id, DocumentPatch::default())
    .await
    .unwrap();
  s.review_submission(
    submission.submission_id,
    admin.applicant_id,
    ReviewDecision::Approved,
    None,
  )
  .await
  .unwrap();

  let err = s
    .review_submission(
      submission.submission_id,
      admin.applicant_id,
      ReviewDecision::Rejected,
      None,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyReviewed(_)));
}

#[tokio::test]
async fn review_missing_submission() {
  let s = store().await;
  let err = s
    .review_submission(Uuid::new_v4(), Uuid::new_v4(), ReviewDecision::Approved, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubmissionNotFound(_)));
}

#[tokio::test]
async fn submissions_filtered_by_status() {
  let s = store().await;
  let alice = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();
  let bob = s
    .register_applicant(registration("bob@example.com", "24060122002"))
    .await
    .unwrap();
  let admin = s
    .register_applicant(Registration {
      role: Role::Admin,
      ..registration("admin@example.com", "24060122999")
    })
    .await
    .unwrap();

  let first = s
    .submit_documents(alice.applicant_id, DocumentPatch::default())
    .await
    .unwrap();
  s.submit_documents(bob.applicant_id, DocumentPatch::default())
    .await
    .unwrap();
  s.review_submission(
    first.submission_id,
    admin.applicant_id,
    ReviewDecision::Approved,
    None,
  )
  .await
  .unwrap();

  let pending = s
    .submissions(Some(VerificationStatus::Pending))
    .await
    .unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].applicant_id, bob.applicant_id);

  let all = s.submissions(None).await.unwrap();
  assert_eq!(all.len(), 2);
}

// ─── Payments ────────────────────────────────────────────────────────────────

fn new_payment(applicant_id: Uuid) -> NewPayment {
  NewPayment {
    order_id:           new_order_id(Utc::now()),
    applicant_id,
    provider:           "midtrans".into(),
    amount:             50_000,
    payment_url:        Some("https://app.example.com/snap/v4/t".into()),
    external_reference: Some("token-123".into()),
  }
}

#[tokio::test]
async fn create_payment_starts_pending() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let payment = s.create_payment(new_payment(applicant.applicant_id)).await.unwrap();
  assert_eq!(payment.status, PaymentStatus::Pending);
  assert!(payment.paid_at.is_none());

  let active = s.active_payment(applicant.applicant_id).await.unwrap().unwrap();
  assert_eq!(active.order_id, payment.order_id);
}

#[tokio::test]
async fn second_active_payment_is_rejected() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  s.create_payment(new_payment(applicant.applicant_id)).await.unwrap();
  let err = s
    .create_payment(new_payment(applicant.applicant_id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ActivePaymentExists(_)));
}

#[tokio::test]
async fn failed_payment_frees_the_active_slot() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let payment = s.create_payment(new_payment(applicant.applicant_id)).await.unwrap();
  s.set_payment_status(&payment.order_id, PaymentStatus::Failed, None)
    .await
    .unwrap();

  assert!(s.active_payment(applicant.applicant_id).await.unwrap().is_none());

  // A fresh attempt is allowed once the previous one failed.
  s.create_payment(new_payment(applicant.applicant_id)).await.unwrap();
}

#[tokio::test]
async fn set_payment_status_records_paid_at() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let payment = s.create_payment(new_payment(applicant.applicant_id)).await.unwrap();
  let paid_at = Utc::now();
  let updated = s
    .set_payment_status(&payment.order_id, PaymentStatus::Paid, Some(paid_at))
    .await
    .unwrap();
  assert_eq!(updated.status, PaymentStatus::Paid);
  assert_eq!(updated.paid_at, Some(paid_at));
}

#[tokio::test]
async fn paid_status_only_yields_to_failed() {
  let s = store().await;
  let applicant = s
    .register_applicant(registration("alice@example.com", "24060122001"))
    .await
    .unwrap();

  let payment = s.create_payment(new_payment(applicant.applicant_id)).await.unwrap();
  let paid_at = Utc::now();
  s.set_payment_status(&payment.order_id, PaymentStatus::Paid, Some(paid_at))
    .await
    .unwrap();

  // A stale pending write is a no-op; the settled row comes back intact.
  let after_stale = s
    .set_payment_status(&payment.order_id, PaymentStatus::Pending, None)
    .await
    .unwrap();
  assert_eq!(after_stale.status, PaymentStatus::Paid);
  assert_eq!(after_stale.paid_at, Some(paid_at));

  // An explicit failure still lands.
  let failed = s
    .set_payment_status(&payment.order_id, PaymentStatus::Failed, None)
    .await
    .unwrap();
  assert_eq!(failed.status, PaymentStatus::Failed);
  assert!(failed.paid_at.is_none());
}

#[tokio::test]
async fn set_payment_status_unknown_order() {
  let s = store().await;
  let err = s
    .set_payment_status("OR-20260101-missing", PaymentStatus::Paid, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PaymentNotFound(_)));
}

// ─── Timeline ────────────────────────────────────────────────────────────────

fn draft(title: &str, order_index: i64) -> TimelineDraft {
  let start = Utc::now() + Duration::days(order_index);
  TimelineDraft {
    title:       title.into(),
    description: None,
    start_at:    start,
    end_at:      start + Duration::days(1),
    order_index,
  }
}

#[tokio::test]
async fn timeline_is_ordered_by_index() {
  let s = store().await;
  s.create_timeline_event(draft("Interview", 2)).await.unwrap();
  s.create_timeline_event(draft("Open registration", 0)).await.unwrap();
  s.create_timeline_event(draft("Document review", 1)).await.unwrap();

  let events = s.timeline().await.unwrap();
  let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, ["Open registration", "Document review", "Interview"]);
}

#[tokio::test]
async fn update_timeline_event_merges_patch() {
  let s = store().await;
  let event = s.create_timeline_event(draft("Interview", 0)).await.unwrap();

  let updated = s
    .update_timeline_event(event.event_id, TimelinePatch {
      title: Some("Final interview".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.title, "Final interview");
  assert_eq!(updated.start_at, event.start_at);
  assert_eq!(updated.order_index, event.order_index);
}

#[tokio::test]
async fn delete_timeline_event() {
  let s = store().await;
  let event = s.create_timeline_event(draft("Interview", 0)).await.unwrap();

  s.delete_timeline_event(event.event_id).await.unwrap();
  assert!(s.timeline_event(event.event_id).await.unwrap().is_none());

  let err = s.delete_timeline_event(event.event_id).await.unwrap_err();
  assert!(matches!(err, Error::EventNotFound(_)));
}
