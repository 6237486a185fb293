//! Handlers for `/api/timeline` endpoints. Reading is open to any
//! authenticated applicant; mutation is admin-only.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use oprec_core::{
  files::FileStore,
  gateway::PaymentGateway,
  store::RecruitStore,
  timeline::{TimelineDraft, TimelineEvent, TimelinePatch},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOnly, CurrentUser},
  error::ApiError,
};

/// `GET /api/timeline`
pub async fn list<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _user: CurrentUser,
) -> Result<Json<Vec<TimelineEvent>>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let events = state.store.timeline().await.map_err(ApiError::store)?;
  Ok(Json(events))
}

fn validate(title: &str, start_at: chrono::DateTime<chrono::Utc>, end_at: chrono::DateTime<chrono::Utc>) -> Result<(), ApiError> {
  if title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }
  if end_at < start_at {
    return Err(ApiError::BadRequest("end_at precedes start_at".into()));
  }
  Ok(())
}

/// `POST /api/timeline`
pub async fn create<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _admin: AdminOnly,
  Json(draft): Json<TimelineDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  validate(&draft.title, draft.start_at, draft.end_at)?;
  let event = state
    .store
    .create_timeline_event(draft)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `PATCH /api/timeline/{id}`
pub async fn update<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _admin: AdminOnly,
  Path(id): Path<Uuid>,
  Json(patch): Json<TimelinePatch>,
) -> Result<Json<TimelineEvent>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let current = state
    .store
    .timeline_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("timeline event {id} not found")))?;

  // Validate the merged result so a patch cannot invert the interval.
  let title = patch.title.clone().unwrap_or_else(|| current.title.clone());
  let start_at = patch.start_at.unwrap_or(current.start_at);
  let end_at = patch.end_at.unwrap_or(current.end_at);
  validate(&title, start_at, end_at)?;

  let updated = state
    .store
    .update_timeline_event(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /api/timeline/{id}`
pub async fn remove<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _admin: AdminOnly,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  state
    .store
    .timeline_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("timeline event {id} not found")))?;
  state
    .store
    .delete_timeline_event(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
