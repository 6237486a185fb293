//! Profile — the applicant's personal data and chosen hierarchy track.
//!
//! Completeness is never stored; it is recomputed from the current row on
//! every progress query so it can never drift from the stored profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The 1:1 profile owned by an applicant. `full_name` and `nim` are filled
/// at registration; everything else starts empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub applicant_id:    Uuid,
  pub full_name:       String,
  /// Student identification number; unique across all profiles.
  pub nim:             String,
  pub nickname:        Option<String>,
  pub whatsapp_number: Option<String>,
  pub study_program:   Option<String>,
  pub department_id:   Option<Uuid>,
  pub division_id:     Option<Uuid>,
  pub sub_division_id: Option<Uuid>,
  pub avatar_url:      Option<String>,
  pub updated_at:      DateTime<Utc>,
}

impl Profile {
  /// True iff all seven required fields are non-empty: full name, nim,
  /// whatsapp number, study program, and the full department / division /
  /// sub-division selection.
  pub fn is_complete(&self) -> bool {
    !self.full_name.is_empty()
      && !self.nim.is_empty()
      && self.whatsapp_number.as_deref().is_some_and(|s| !s.is_empty())
      && self.study_program.as_deref().is_some_and(|s| !s.is_empty())
      && self.department_id.is_some()
      && self.division_id.is_some()
      && self.sub_division_id.is_some()
  }
}

/// A partial profile update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub full_name:       Option<String>,
  pub nickname:        Option<String>,
  pub whatsapp_number: Option<String>,
  pub study_program:   Option<String>,
  pub department_id:   Option<Uuid>,
  pub division_id:     Option<Uuid>,
  pub sub_division_id: Option<Uuid>,
}

impl ProfileUpdate {
  /// Whether the update touches the department/division/sub-division
  /// selection at all. Hierarchy containment is re-validated whenever this
  /// is true.
  pub fn touches_hierarchy(&self) -> bool {
    self.department_id.is_some()
      || self.division_id.is_some()
      || self.sub_division_id.is_some()
  }

  /// Merge this update into `profile`, returning the effective post-update
  /// row. Validation runs against the merged result, not the raw request,
  /// so a partial update cannot leave a stale mismatched selection behind.
  pub fn apply(&self, profile: &Profile) -> Profile {
    Profile {
      applicant_id:    profile.applicant_id,
      full_name:       self
        .full_name
        .clone()
        .unwrap_or_else(|| profile.full_name.clone()),
      nim:             profile.nim.clone(),
      nickname:        self.nickname.clone().or_else(|| profile.nickname.clone()),
      whatsapp_number: self
        .whatsapp_number
        .clone()
        .or_else(|| profile.whatsapp_number.clone()),
      study_program:   self
        .study_program
        .clone()
        .or_else(|| profile.study_program.clone()),
      department_id:   self.department_id.or(profile.department_id),
      division_id:     self.division_id.or(profile.division_id),
      sub_division_id: self.sub_division_id.or(profile.sub_division_id),
      avatar_url:      profile.avatar_url.clone(),
      updated_at:      profile.updated_at,
    }
  }
}
