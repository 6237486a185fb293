//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum discriminants are
//! stored as lowercase strings. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use oprec_core::{
  applicant::{Applicant, Role},
  payment::{Payment, PaymentStatus},
  profile::Profile,
  timeline::TimelineEvent,
  verification::{Submission, VerificationStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Applicant => "applicant",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "applicant" => Ok(Role::Applicant),
    "admin" => Ok(Role::Admin),
    other => Err(Error::UnknownValue(format!("role: {other:?}"))),
  }
}

// ─── VerificationStatus ──────────────────────────────────────────────────────

pub fn encode_verification_status(s: VerificationStatus) -> &'static str {
  match s {
    VerificationStatus::Pending => "pending",
    VerificationStatus::Approved => "approved",
    VerificationStatus::Rejected => "rejected",
  }
}

pub fn decode_verification_status(s: &str) -> Result<VerificationStatus> {
  match s {
    "pending" => Ok(VerificationStatus::Pending),
    "approved" => Ok(VerificationStatus::Approved),
    "rejected" => Ok(VerificationStatus::Rejected),
    other => Err(Error::UnknownValue(format!("verification status: {other:?}"))),
  }
}

// ─── PaymentStatus ───────────────────────────────────────────────────────────

pub fn encode_payment_status(s: PaymentStatus) -> &'static str {
  match s {
    PaymentStatus::Pending => "pending",
    PaymentStatus::Paid => "paid",
    PaymentStatus::Failed => "failed",
  }
}

pub fn decode_payment_status(s: &str) -> Result<PaymentStatus> {
  match s {
    "pending" => Ok(PaymentStatus::Pending),
    "paid" => Ok(PaymentStatus::Paid),
    "failed" => Ok(PaymentStatus::Failed),
    other => Err(Error::UnknownValue(format!("payment status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `applicants` row.
pub struct RawApplicant {
  pub applicant_id:  String,
  pub email:         String,
  pub password_hash: String,
  pub role:          String,
  pub created_at:    String,
}

impl RawApplicant {
  pub fn into_applicant(self) -> Result<Applicant> {
    Ok(Applicant {
      applicant_id:  decode_uuid(&self.applicant_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub applicant_id:    String,
  pub full_name:       String,
  pub nim:             String,
  pub nickname:        Option<String>,
  pub whatsapp_number: Option<String>,
  pub study_program:   Option<String>,
  pub department_id:   Option<String>,
  pub division_id:     Option<String>,
  pub sub_division_id: Option<String>,
  pub avatar_url:      Option<String>,
  pub updated_at:      String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      applicant_id:    decode_uuid(&self.applicant_id)?,
      full_name:       self.full_name,
      nim:             self.nim,
      nickname:        self.nickname,
      whatsapp_number: self.whatsapp_number,
      study_program:   self.study_program,
      department_id:   decode_opt_uuid(self.department_id)?,
      division_id:     decode_opt_uuid(self.division_id)?,
      sub_division_id: decode_opt_uuid(self.sub_division_id)?,
      avatar_url:      self.avatar_url,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id:    String,
  pub applicant_id:     String,
  pub study_plan_url:   Option<String>,
  pub formal_photo_url: Option<String>,
  pub follow_proof_url: Option<String>,
  pub share_proof_url:  Option<String>,
  pub social_link:      Option<String>,
  pub status:           String,
  pub rejection_reason: Option<String>,
  pub reviewed_by:      Option<String>,
  pub reviewed_at:      Option<String>,
  pub created_at:       String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id:    decode_uuid(&self.submission_id)?,
      applicant_id:     decode_uuid(&self.applicant_id)?,
      study_plan_url:   self.study_plan_url,
      formal_photo_url: self.formal_photo_url,
      follow_proof_url: self.follow_proof_url,
      share_proof_url:  self.share_proof_url,
      social_link:      self.social_link,
      status:           decode_verification_status(&self.status)?,
      rejection_reason: self.rejection_reason,
      reviewed_by:      decode_opt_uuid(self.reviewed_by)?,
      reviewed_at:      decode_opt_dt(self.reviewed_at)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `payments` row.
pub struct RawPayment {
  pub order_id:           String,
  pub applicant_id:       String,
  pub provider:           String,
  pub amount:             i64,
  pub status:             String,
  pub payment_url:        Option<String>,
  pub external_reference: Option<String>,
  pub paid_at:            Option<String>,
  pub created_at:         String,
}

impl RawPayment {
  pub fn into_payment(self) -> Result<Payment> {
    Ok(Payment {
      order_id:           self.order_id,
      applicant_id:       decode_uuid(&self.applicant_id)?,
      provider:           self.provider,
      amount:             self.amount,
      status:             decode_payment_status(&self.status)?,
      payment_url:        self.payment_url,
      external_reference: self.external_reference,
      paid_at:            decode_opt_dt(self.paid_at)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `timeline_events` row.
pub struct RawTimelineEvent {
  pub event_id:    String,
  pub title:       String,
  pub description: Option<String>,
  pub start_at:    String,
  pub end_at:      String,
  pub order_index: i64,
}

impl RawTimelineEvent {
  pub fn into_event(self) -> Result<TimelineEvent> {
    Ok(TimelineEvent {
      event_id:    decode_uuid(&self.event_id)?,
      title:       self.title,
      description: self.description,
      start_at:    decode_dt(&self.start_at)?,
      end_at:      decode_dt(&self.end_at)?,
      order_index: self.order_index,
    })
  }
}

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}
