//! Recruitment timeline — ordered reference events shown on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single timeline entry, ordered by its explicit `order_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub event_id:    Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub start_at:    DateTime<Utc>,
  pub end_at:      DateTime<Utc>,
  pub order_index: i64,
}

/// Input to [`crate::store::RecruitStore::create_timeline_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineDraft {
  pub title:       String,
  pub description: Option<String>,
  pub start_at:    DateTime<Utc>,
  pub end_at:      DateTime<Utc>,
  pub order_index: i64,
}

/// A partial timeline update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelinePatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub start_at:    Option<DateTime<Utc>>,
  pub end_at:      Option<DateTime<Utc>>,
  pub order_index: Option<i64>,
}

/// The first event (in ascending order-index order) whose start instant is
/// strictly after `now`. Expects `events` already sorted by order index.
pub fn next_event(
  events: &[TimelineEvent],
  now:    DateTime<Utc>,
) -> Option<&TimelineEvent> {
  events.iter().find(|e| e.start_at > now)
}
