//! Handler for `/api/dashboard/me` — the aggregated progress view.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use oprec_core::{
  files::FileStore,
  gateway::PaymentGateway,
  payment::PaymentState,
  progress,
  store::RecruitStore,
  timeline::next_event,
  verification::VerificationState,
};
use serde_json::json;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `GET /api/dashboard/me`
pub async fn me<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let profile = state
    .store
    .profile(user.applicant_id)
    .await
    .map_err(ApiError::store)?;
  let submission = state
    .store
    .latest_submission(user.applicant_id)
    .await
    .map_err(ApiError::store)?;
  let payment = state
    .store
    .latest_payment(user.applicant_id)
    .await
    .map_err(ApiError::store)?;

  let view = progress::compute(
    profile.as_ref(),
    VerificationState::from_latest(submission.as_ref().map(|s| s.status)),
    PaymentState::from_latest(payment.as_ref().map(|p| p.status)),
  );

  let events = state.store.timeline().await.map_err(ApiError::store)?;
  let upcoming = next_event(&events, Utc::now());

  let sub_division = match profile.as_ref().and_then(|p| p.sub_division_id) {
    Some(id) => state
      .store
      .sub_division(id)
      .await
      .map_err(ApiError::store)?
      .map(|sd| sd.name),
    None => None,
  };

  Ok(Json(json!({
    "applicant": {
      "applicant_id": user.applicant_id,
      "full_name":    profile.as_ref().map(|p| p.full_name.clone()),
      "sub_division": sub_division,
    },
    "progress":   view.progress,
    "steps":      view.steps,
    "next_event": upcoming,
  })))
}
