//! [`SqliteStore`] — the SQLite implementation of
//! [`RecruitStore`](oprec_core::store::RecruitStore).

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use oprec_core::{
  applicant::{Applicant, Registration},
  hierarchy::{Department, Division, SubDivision},
  payment::{NewPayment, Payment, PaymentStatus},
  profile::{Profile, ProfileUpdate},
  store::RecruitStore,
  timeline::{TimelineDraft, TimelineEvent, TimelinePatch},
  verification::{
    DocumentPatch, ReviewDecision, Submission, VerificationStatus,
  },
};

use crate::{
  encode::{
    RawApplicant, RawPayment, RawProfile, RawSubmission, RawTimelineEvent,
    encode_dt, encode_payment_status, encode_role, encode_uuid,
    encode_verification_status,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Column lists ────────────────────────────────────────────────────────────

const APPLICANT_COLS: &str =
  "applicant_id, email, password_hash, role, created_at";
const PROFILE_COLS: &str = "applicant_id, full_name, nim, nickname, \
   whatsapp_number, study_program, department_id, division_id, \
   sub_division_id, avatar_url, updated_at";
const SUBMISSION_COLS: &str = "submission_id, applicant_id, study_plan_url, \
   formal_photo_url, follow_proof_url, share_proof_url, social_link, status, \
   rejection_reason, reviewed_by, reviewed_at, created_at";
const PAYMENT_COLS: &str = "order_id, applicant_id, provider, amount, \
   status, payment_url, external_reference, paid_at, created_at";
const EVENT_COLS: &str =
  "event_id, title, description, start_at, end_at, order_index";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn applicant_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawApplicant> {
  Ok(RawApplicant {
    applicant_id:  row.get(0)?,
    email:         row.get(1)?,
    password_hash: row.get(2)?,
    role:          row.get(3)?,
    created_at:    row.get(4)?,
  })
}

fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    applicant_id:    row.get(0)?,
    full_name:       row.get(1)?,
    nim:             row.get(2)?,
    nickname:        row.get(3)?,
    whatsapp_number: row.get(4)?,
    study_program:   row.get(5)?,
    department_id:   row.get(6)?,
    division_id:     row.get(7)?,
    sub_division_id: row.get(8)?,
    avatar_url:      row.get(9)?,
    updated_at:      row.get(10)?,
  })
}

fn submission_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawSubmission> {
  Ok(RawSubmission {
    submission_id:    row.get(0)?,
    applicant_id:     row.get(1)?,
    study_plan_url:   row.get(2)?,
    formal_photo_url: row.get(3)?,
    follow_proof_url: row.get(4)?,
    share_proof_url:  row.get(5)?,
    social_link:      row.get(6)?,
    status:           row.get(7)?,
    rejection_reason: row.get(8)?,
    reviewed_by:      row.get(9)?,
    reviewed_at:      row.get(10)?,
    created_at:       row.get(11)?,
  })
}

fn payment_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawPayment> {
  Ok(RawPayment {
    order_id:           row.get(0)?,
    applicant_id:       row.get(1)?,
    provider:           row.get(2)?,
    amount:             row.get(3)?,
    status:             row.get(4)?,
    payment_url:        row.get(5)?,
    external_reference: row.get(6)?,
    paid_at:            row.get(7)?,
    created_at:         row.get(8)?,
  })
}

fn event_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawTimelineEvent> {
  Ok(RawTimelineEvent {
    event_id:    row.get(0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
    start_at:    row.get(3)?,
    end_at:      row.get(4)?,
    order_index: row.get(5)?,
  })
}

/// True when an error is a UNIQUE/CHECK constraint violation — used to map
/// the active-payment index into a domain error.
fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A recruitment store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection {
    &self.conn
  }

  async fn fetch_submission(&self, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBMISSION_COLS} FROM submissions WHERE submission_id = ?1"
              ),
              rusqlite::params![id_str],
              submission_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn fetch_payment(&self, order_id: &str) -> Result<Option<Payment>> {
    let order_id = order_id.to_owned();
    let raw: Option<RawPayment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PAYMENT_COLS} FROM payments WHERE order_id = ?1"),
              rusqlite::params![order_id],
              payment_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPayment::into_payment).transpose()
  }

  async fn fetch_profile(&self, applicant_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(applicant_id);
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLS} FROM profiles WHERE applicant_id = ?1"),
              rusqlite::params![id_str],
              profile_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }
}

// ─── RecruitStore impl ───────────────────────────────────────────────────────

impl RecruitStore for SqliteStore {
  type Error = Error;

  // ── Applicants ────────────────────────────────────────────────────────────

  async fn register_applicant(&self, input: Registration) -> Result<Applicant> {
    // Pre-checks give precise duplicate errors; the UNIQUE constraints in
    // the transaction below remain the race-proof backstop.
    if self.applicant_by_email(&input.email).await?.is_some() {
      return Err(Error::EmailTaken(input.email));
    }

    let nim = input.nim.clone();
    let nim_taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM profiles WHERE nim = ?1",
              rusqlite::params![nim],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if nim_taken {
      return Err(Error::NimTaken(input.nim));
    }

    let applicant = Applicant {
      applicant_id:  Uuid::new_v4(),
      email:         input.email,
      password_hash: input.password_hash,
      role:          input.role,
      created_at:    Utc::now(),
    };

    let id_str    = encode_uuid(applicant.applicant_id);
    let email     = applicant.email.clone();
    let hash      = applicant.password_hash.clone();
    let role_str  = encode_role(applicant.role).to_owned();
    let at_str    = encode_dt(applicant.created_at);
    let full_name = input.full_name;
    let nim       = input.nim;

    // Applicant and profile are created together or not at all.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO applicants (applicant_id, email, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, hash, role_str, at_str],
        )?;
        tx.execute(
          "INSERT INTO profiles (applicant_id, full_name, nim, updated_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, full_name, nim, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(applicant)
  }

  async fn applicant(&self, id: Uuid) -> Result<Option<Applicant>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawApplicant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {APPLICANT_COLS} FROM applicants WHERE applicant_id = ?1"),
              rusqlite::params![id_str],
              applicant_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawApplicant::into_applicant).transpose()
  }

  async fn applicant_by_email(&self, email: &str) -> Result<Option<Applicant>> {
    let email = email.to_owned();
    let raw: Option<RawApplicant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {APPLICANT_COLS} FROM applicants WHERE email = ?1"),
              rusqlite::params![email],
              applicant_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawApplicant::into_applicant).transpose()
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn profile(&self, applicant_id: Uuid) -> Result<Option<Profile>> {
    self.fetch_profile(applicant_id).await
  }

  async fn profile_by_nim(&self, nim: &str) -> Result<Option<Profile>> {
    let nim = nim.to_owned();
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLS} FROM profiles WHERE nim = ?1"),
              rusqlite::params![nim],
              profile_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile(
    &self,
    applicant_id: Uuid,
    update:       ProfileUpdate,
  ) -> Result<Profile> {
    let current = self
      .fetch_profile(applicant_id)
      .await?
      .ok_or(Error::ProfileNotFound(applicant_id))?;

    let mut merged = update.apply(&current);
    merged.updated_at = Utc::now();

    let id_str          = encode_uuid(applicant_id);
    let full_name       = merged.full_name.clone();
    let nickname        = merged.nickname.clone();
    let whatsapp_number = merged.whatsapp_number.clone();
    let study_program   = merged.study_program.clone();
    let department_id   = merged.department_id.map(encode_uuid);
    let division_id     = merged.division_id.map(encode_uuid);
    let sub_division_id = merged.sub_division_id.map(encode_uuid);
    let updated_at      = encode_dt(merged.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE profiles SET
             full_name = ?2, nickname = ?3, whatsapp_number = ?4,
             study_program = ?5, department_id = ?6, division_id = ?7,
             sub_division_id = ?8, updated_at = ?9
           WHERE applicant_id = ?1",
          rusqlite::params![
            id_str,
            full_name,
            nickname,
            whatsapp_number,
            study_program,
            department_id,
            division_id,
            sub_division_id,
            updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(merged)
  }

  async fn set_avatar(
    &self,
    applicant_id: Uuid,
    avatar_url:   String,
  ) -> Result<Profile> {
    let id_str = encode_uuid(applicant_id);
    let url    = avatar_url.clone();
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET avatar_url = ?2, updated_at = ?3 WHERE applicant_id = ?1",
          rusqlite::params![id_str, url, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ProfileNotFound(applicant_id));
    }

    self
      .fetch_profile(applicant_id)
      .await?
      .ok_or(Error::ProfileNotFound(applicant_id))
  }

  // ── Hierarchy catalog ─────────────────────────────────────────────────────

  async fn departments(&self) -> Result<Vec<Department>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT department_id, name FROM departments ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, name)| {
        Ok(Department { department_id: crate::encode::decode_uuid(&id)?, name })
      })
      .collect()
  }

  async fn divisions(&self, department_id: Uuid) -> Result<Vec<Division>> {
    let dept_str = encode_uuid(department_id);
    let rows: Vec<(String, String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT division_id, department_id, name FROM divisions
           WHERE department_id = ?1 ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![dept_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, dept, name)| {
        Ok(Division {
          division_id:   crate::encode::decode_uuid(&id)?,
          department_id: crate::encode::decode_uuid(&dept)?,
          name,
        })
      })
      .collect()
  }

  async fn sub_divisions(&self, division_id: Uuid) -> Result<Vec<SubDivision>> {
    let div_str = encode_uuid(division_id);
    let rows: Vec<(String, String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sub_division_id, division_id, name FROM sub_divisions
           WHERE division_id = ?1 ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![div_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, div, name)| {
        Ok(SubDivision {
          sub_division_id: crate::encode::decode_uuid(&id)?,
          division_id:     crate::encode::decode_uuid(&div)?,
          name,
        })
      })
      .collect()
  }

  async fn division(&self, id: Uuid) -> Result<Option<Division>> {
    let id_str = encode_uuid(id);
    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT division_id, department_id, name FROM divisions WHERE division_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, dept, name)| {
        Ok(Division {
          division_id:   crate::encode::decode_uuid(&id)?,
          department_id: crate::encode::decode_uuid(&dept)?,
          name,
        })
      })
      .transpose()
  }

  async fn sub_division(&self, id: Uuid) -> Result<Option<SubDivision>> {
    let id_str = encode_uuid(id);
    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sub_division_id, division_id, name FROM sub_divisions
               WHERE sub_division_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, div, name)| {
        Ok(SubDivision {
          sub_division_id: crate::encode::decode_uuid(&id)?,
          division_id:     crate::encode::decode_uuid(&div)?,
          name,
        })
      })
      .transpose()
  }

  // ── Verification ──────────────────────────────────────────────────────────

  async fn latest_submission(
    &self,
    applicant_id: Uuid,
  ) -> Result<Option<Submission>> {
    let id_str = encode_uuid(applicant_id);
    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBMISSION_COLS} FROM submissions
                 WHERE applicant_id = ?1
                 ORDER BY created_at DESC LIMIT 1"
              ),
              rusqlite::params![id_str],
              submission_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn submission(&self, id: Uuid) -> Result<Option<Submission>> {
    self.fetch_submission(id).await
  }

  async fn submit_documents(
    &self,
    applicant_id: Uuid,
    patch:        DocumentPatch,
  ) -> Result<Submission> {
    let id_str = encode_uuid(applicant_id);

    let open: Option<RawSubmission> = self
      .conn
      .call({
        let id_str = id_str.clone();
        move |conn| {
          Ok(
            conn
              .query_row(
                &format!(
                  "SELECT {SUBMISSION_COLS} FROM submissions
                   WHERE applicant_id = ?1 AND status = 'pending'"
                ),
                rusqlite::params![id_str],
                submission_from_row,
              )
              .optional()?,
          )
        }
      })
      .await?;

    if let Some(raw) = open {
      // Merge into the open Pending row; fields not re-supplied keep
      // their prior values. The status guard in the WHERE clause keeps a
      // concurrent review from being overwritten.
      let existing = raw.into_submission()?;
      let submission_id = existing.submission_id;

      let sub_id_str   = encode_uuid(submission_id);
      let study_plan   = patch.study_plan_url.or(existing.study_plan_url);
      let formal_photo = patch.formal_photo_url.or(existing.formal_photo_url);
      let follow_proof = patch.follow_proof_url.or(existing.follow_proof_url);
      let share_proof  = patch.share_proof_url.or(existing.share_proof_url);
      let social_link  = patch.social_link.or(existing.social_link);

      self
        .conn
        .call(move |conn| {
          conn.execute(
            "UPDATE submissions SET
               study_plan_url = ?2, formal_photo_url = ?3,
               follow_proof_url = ?4, share_proof_url = ?5, social_link = ?6
             WHERE submission_id = ?1 AND status = 'pending'",
            rusqlite::params![
              sub_id_str,
              study_plan,
              formal_photo,
              follow_proof,
              share_proof,
              social_link,
            ],
          )?;
          Ok(())
        })
        .await?;

      return self
        .fetch_submission(submission_id)
        .await?
        .ok_or(Error::SubmissionNotFound(submission_id));
    }

    let submission = Submission {
      submission_id:    Uuid::new_v4(),
      applicant_id,
      study_plan_url:   patch.study_plan_url,
      formal_photo_url: patch.formal_photo_url,
      follow_proof_url: patch.follow_proof_url,
      share_proof_url:  patch.share_proof_url,
      social_link:      patch.social_link,
      status:           VerificationStatus::Pending,
      rejection_reason: None,
      reviewed_by:      None,
      reviewed_at:      None,
      created_at:       Utc::now(),
    };

    let sub_id_str   = encode_uuid(submission.submission_id);
    let study_plan   = submission.study_plan_url.clone();
    let formal_photo = submission.formal_photo_url.clone();
    let follow_proof = submission.follow_proof_url.clone();
    let share_proof  = submission.share_proof_url.clone();
    let social_link  = submission.social_link.clone();
    let at_str       = encode_dt(submission.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions (
             submission_id, applicant_id, study_plan_url, formal_photo_url,
             follow_proof_url, share_proof_url, social_link, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8)",
          rusqlite::params![
            sub_id_str,
            id_str,
            study_plan,
            formal_photo,
            follow_proof,
            share_proof,
            social_link,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(submission)
  }

  async fn review_submission(
    &self,
    submission_id:    Uuid,
    admin_id:         Uuid,
    decision:         ReviewDecision,
    rejection_reason: Option<String>,
  ) -> Result<Submission> {
    let existing = self
      .fetch_submission(submission_id)
      .await?
      .ok_or(Error::SubmissionNotFound(submission_id))?;

    if existing.status.is_terminal() {
      return Err(Error::AlreadyReviewed(submission_id));
    }

    // A rejection reason is only meaningful on rejection.
    let reason = match decision {
      ReviewDecision::Rejected => rejection_reason,
      ReviewDecision::Approved => None,
    };

    let sub_id_str   = encode_uuid(submission_id);
    let admin_id_str = encode_uuid(admin_id);
    let status_str   = encode_verification_status(decision.status()).to_owned();
    let at_str       = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE submissions SET
             status = ?2, rejection_reason = ?3, reviewed_by = ?4, reviewed_at = ?5
           WHERE submission_id = ?1 AND status = 'pending'",
          rusqlite::params![sub_id_str, status_str, reason, admin_id_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      // Lost a race against another reviewer.
      return Err(Error::AlreadyReviewed(submission_id));
    }

    self
      .fetch_submission(submission_id)
      .await?
      .ok_or(Error::SubmissionNotFound(submission_id))
  }

  async fn submissions(
    &self,
    status: Option<VerificationStatus>,
  ) -> Result<Vec<Submission>> {
    let status_str =
      status.map(encode_verification_status).map(str::to_owned);

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLS} FROM submissions
             WHERE status = ?1 ORDER BY created_at DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![s], submission_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLS} FROM submissions ORDER BY created_at DESC"
          ))?;
          stmt
            .query_map([], submission_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  // ── Payments ──────────────────────────────────────────────────────────────

  async fn latest_payment(&self, applicant_id: Uuid) -> Result<Option<Payment>> {
    let id_str = encode_uuid(applicant_id);
    let raw: Option<RawPayment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PAYMENT_COLS} FROM payments
                 WHERE applicant_id = ?1
                 ORDER BY created_at DESC LIMIT 1"
              ),
              rusqlite::params![id_str],
              payment_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPayment::into_payment).transpose()
  }

  async fn active_payment(&self, applicant_id: Uuid) -> Result<Option<Payment>> {
    let id_str = encode_uuid(applicant_id);
    let raw: Option<RawPayment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PAYMENT_COLS} FROM payments
                 WHERE applicant_id = ?1 AND status IN ('pending', 'paid')
                 ORDER BY created_at DESC LIMIT 1"
              ),
              rusqlite::params![id_str],
              payment_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPayment::into_payment).transpose()
  }

  async fn create_payment(&self, input: NewPayment) -> Result<Payment> {
    let payment = Payment {
      order_id:           input.order_id,
      applicant_id:       input.applicant_id,
      provider:           input.provider,
      amount:             input.amount,
      status:             PaymentStatus::Pending,
      payment_url:        input.payment_url,
      external_reference: input.external_reference,
      paid_at:            None,
      created_at:         Utc::now(),
    };

    let order_id   = payment.order_id.clone();
    let id_str     = encode_uuid(payment.applicant_id);
    let provider   = payment.provider.clone();
    let amount     = payment.amount;
    let url        = payment.payment_url.clone();
    let reference  = payment.external_reference.clone();
    let at_str     = encode_dt(payment.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO payments (
             order_id, applicant_id, provider, amount, status,
             payment_url, external_reference, created_at
           ) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, ?7)",
          rusqlite::params![order_id, id_str, provider, amount, url, reference, at_str],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Ok(()) => Ok(payment),
      Err(e) if is_constraint_violation(&e) => {
        Err(Error::ActivePaymentExists(payment.applicant_id))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn payment(&self, order_id: &str) -> Result<Option<Payment>> {
    self.fetch_payment(order_id).await
  }

  async fn set_payment_status(
    &self,
    order_id: &str,
    status:   PaymentStatus,
    paid_at:  Option<chrono::DateTime<Utc>>,
  ) -> Result<Payment> {
    let order_id_owned = order_id.to_owned();
    let status_str     = encode_payment_status(status).to_owned();
    let paid_at_str    = paid_at.map(encode_dt);

    // The Paid-is-sticky rule lives in the predicate so two notifications
    // racing through the handler cannot interleave into a regression.
    let raw: Option<RawPayment> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE payments SET status = ?2, paid_at = ?3
            WHERE order_id = ?1 AND (status != 'paid' OR ?2 = 'failed')",
          rusqlite::params![order_id_owned, status_str, paid_at_str],
        )?;
        Ok(
          conn
            .query_row(
              &format!("SELECT {PAYMENT_COLS} FROM payments WHERE order_id = ?1"),
              rusqlite::params![order_id_owned],
              payment_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawPayment::into_payment)
      .transpose()?
      .ok_or_else(|| Error::PaymentNotFound(order_id.to_owned()))
  }

  async fn payments(&self) -> Result<Vec<Payment>> {
    let raws: Vec<RawPayment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PAYMENT_COLS} FROM payments ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], payment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPayment::into_payment).collect()
  }

  // ── Timeline ──────────────────────────────────────────────────────────────

  async fn timeline(&self) -> Result<Vec<TimelineEvent>> {
    let raws: Vec<RawTimelineEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLS} FROM timeline_events ORDER BY order_index ASC"
        ))?;
        let rows = stmt
          .query_map([], event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTimelineEvent::into_event).collect()
  }

  async fn timeline_event(&self, id: Uuid) -> Result<Option<TimelineEvent>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawTimelineEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLS} FROM timeline_events WHERE event_id = ?1"),
              rusqlite::params![id_str],
              event_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawTimelineEvent::into_event).transpose()
  }

  async fn create_timeline_event(
    &self,
    draft: TimelineDraft,
  ) -> Result<TimelineEvent> {
    let event = TimelineEvent {
      event_id:    Uuid::new_v4(),
      title:       draft.title,
      description: draft.description,
      start_at:    draft.start_at,
      end_at:      draft.end_at,
      order_index: draft.order_index,
    };

    let id_str      = encode_uuid(event.event_id);
    let title       = event.title.clone();
    let description = event.description.clone();
    let start_str   = encode_dt(event.start_at);
    let end_str     = encode_dt(event.end_at);
    let order_index = event.order_index;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO timeline_events (event_id, title, description, start_at, end_at, order_index)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, title, description, start_str, end_str, order_index],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn update_timeline_event(
    &self,
    id:    Uuid,
    patch: TimelinePatch,
  ) -> Result<TimelineEvent> {
    let current = self
      .timeline_event(id)
      .await?
      .ok_or(Error::EventNotFound(id))?;

    let updated = TimelineEvent {
      event_id:    current.event_id,
      title:       patch.title.unwrap_or(current.title),
      description: patch.description.or(current.description),
      start_at:    patch.start_at.unwrap_or(current.start_at),
      end_at:      patch.end_at.unwrap_or(current.end_at),
      order_index: patch.order_index.unwrap_or(current.order_index),
    };

    let id_str      = encode_uuid(id);
    let title       = updated.title.clone();
    let description = updated.description.clone();
    let start_str   = encode_dt(updated.start_at);
    let end_str     = encode_dt(updated.end_at);
    let order_index = updated.order_index;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE timeline_events SET
             title = ?2, description = ?3, start_at = ?4, end_at = ?5, order_index = ?6
           WHERE event_id = ?1",
          rusqlite::params![id_str, title, description, start_str, end_str, order_index],
        )?;
        Ok(())
      })
      .await?;

    Ok(updated)
  }

  async fn delete_timeline_event(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM timeline_events WHERE event_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EventNotFound(id));
    }
    Ok(())
  }
}
