//! Handlers for `/api/verification` endpoints.
//!
//! Submission is open once the profile is complete. While a submission is
//! Pending, re-submitting merges new documents into it; after a rejection a
//! fresh submission opens; after approval further submits are refused.

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
  response::IntoResponse,
};
use oprec_core::{
  files::{FileStore, UploadedFile},
  gateway::PaymentGateway,
  store::RecruitStore,
  verification::{
    DocumentKind, DocumentPatch, ReviewDecision, Submission,
    VerificationState, VerificationStatus,
  },
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOnly, CurrentUser},
  error::ApiError,
};

/// `GET /api/verification/me`
pub async fn me<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let submission = state
    .store
    .latest_submission(user.applicant_id)
    .await
    .map_err(ApiError::store)?;
  let status = VerificationState::from_latest(submission.as_ref().map(|s| s.status));
  Ok(Json(json!({ "status": status, "submission": submission })))
}

fn document_kind(field_name: &str) -> Option<DocumentKind> {
  match field_name {
    "study_plan" => Some(DocumentKind::StudyPlan),
    "formal_photo" => Some(DocumentKind::FormalPhoto),
    "follow_proof" => Some(DocumentKind::FollowProof),
    "share_proof" => Some(DocumentKind::ShareProof),
    _ => None,
  }
}

fn patch_slot<'a>(
  patch: &'a mut DocumentPatch,
  kind:  DocumentKind,
) -> &'a mut Option<String> {
  match kind {
    DocumentKind::StudyPlan => &mut patch.study_plan_url,
    DocumentKind::FormalPhoto => &mut patch.formal_photo_url,
    DocumentKind::FollowProof => &mut patch.follow_proof_url,
    DocumentKind::ShareProof => &mut patch.share_proof_url,
  }
}

/// `POST /api/verification/submit` — multipart with up to four document
/// fields (`study_plan`, `formal_photo`, `follow_proof`, `share_proof`) and
/// an optional `social_link` text field.
pub async fn submit<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
  mut multipart: Multipart,
) -> Result<Json<Submission>, ApiError>
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
  if !profile.is_some_and(|p| p.is_complete()) {
    return Err(ApiError::PreconditionFailed(
      "complete your profile before submitting documents".into(),
    ));
  }

  let latest = state
    .store
    .latest_submission(user.applicant_id)
    .await
    .map_err(ApiError::store)?;
  if latest.is_some_and(|s| s.status == VerificationStatus::Approved) {
    return Err(ApiError::Conflict(
      "submission has already been approved".into(),
    ));
  }

  let mut patch = DocumentPatch::default();
  let mut any_field = false;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::Upload(e.to_string()))?
  {
    let Some(name) = field.name().map(str::to_string) else {
      continue;
    };

    if name == "social_link" {
      let value = field
        .text()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?;
      if !value.trim().is_empty() {
        patch.social_link = Some(value);
        any_field = true;
      }
      continue;
    }

    let Some(kind) = document_kind(&name) else {
      continue;
    };
    let filename = field.file_name().unwrap_or(&name).to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::Upload(e.to_string()))?;
    if bytes.is_empty() {
      return Err(ApiError::BadRequest(format!("{name} file is empty")));
    }

    let url = state
      .files
      .upload(
        UploadedFile { filename, content_type, bytes: bytes.to_vec() },
        kind.folder(),
      )
      .await
      .map_err(|e| ApiError::Upload(e.to_string()))?;
    *patch_slot(&mut patch, kind) = Some(url);
    any_field = true;
  }

  if !any_field {
    return Err(ApiError::BadRequest(
      "provide at least one document or social_link".into(),
    ));
  }

  let submission = state
    .store
    .submit_documents(user.applicant_id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(submission))
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<VerificationStatus>,
}

/// `GET /api/verification/admin/list[?status=<status>]`
pub async fn admin_list<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _admin: AdminOnly,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let submissions = state
    .store
    .submissions(params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(submissions))
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub decision:         ReviewDecision,
  pub rejection_reason: Option<String>,
}

/// `PATCH /api/verification/admin/review/{id}`
pub async fn review<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  AdminOnly(admin): AdminOnly,
  Path(id): Path<Uuid>,
  Json(body): Json<ReviewBody>,
) -> Result<Json<Submission>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  if body.decision == ReviewDecision::Rejected
    && body
      .rejection_reason
      .as_deref()
      .is_none_or(|r| r.trim().is_empty())
  {
    return Err(ApiError::BadRequest(
      "a rejection requires a rejection_reason".into(),
    ));
  }

  let existing = state
    .store
    .submission(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;
  if existing.status.is_terminal() {
    return Err(ApiError::Conflict(
      "submission has already been reviewed".into(),
    ));
  }

  let reviewed = state
    .store
    .review_submission(id, admin.applicant_id, body.decision, body.rejection_reason)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    submission_id = %id,
    decision = ?body.decision,
    "submission reviewed"
  );
  Ok(Json(reviewed))
}
