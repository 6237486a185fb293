//! Handlers for `/api/profile` endpoints.
//!
//! Hierarchy containment is validated against the *merged* profile, so a
//! partial update can never leave a division pointing at the wrong
//! department behind.

use axum::{
  Json,
  extract::{Multipart, State},
  response::IntoResponse,
};
use oprec_core::{
  files::{FileStore, UploadedFile},
  gateway::PaymentGateway,
  hierarchy::check_containment,
  profile::{Profile, ProfileUpdate},
  store::RecruitStore,
};

use crate::{
  AppState,
  auth::CurrentUser,
  error::ApiError,
  files::delete_quietly,
};

/// `GET /api/profile/me`
pub async fn me<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
) -> Result<Json<Profile>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let profile = state
    .store
    .profile(user.applicant_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
  Ok(Json(profile))
}

/// `PATCH /api/profile/me`
pub async fn update<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
  Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let current = state
    .store
    .profile(user.applicant_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;

  if body.touches_hierarchy() {
    let merged = body.apply(&current);

    let division = match merged.division_id {
      Some(id) => Some(
        state
          .store
          .division(id)
          .await
          .map_err(ApiError::store)?
          .ok_or_else(|| ApiError::BadRequest(format!("division {id} not found")))?,
      ),
      None => None,
    };
    let sub_division = match merged.sub_division_id {
      Some(id) => Some(
        state
          .store
          .sub_division(id)
          .await
          .map_err(ApiError::store)?
          .ok_or_else(|| {
            ApiError::BadRequest(format!("sub-division {id} not found"))
          })?,
      ),
      None => None,
    };

    check_containment(
      merged.department_id,
      division.as_ref(),
      sub_division.as_ref(),
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  }

  let updated = state
    .store
    .update_profile(user.applicant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `POST /api/profile/me/avatar` — multipart with an `avatar` image field.
pub async fn avatar<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let current = state
    .store
    .profile(user.applicant_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;

  let mut file = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::Upload(e.to_string()))?
  {
    if field.name() != Some("avatar") {
      continue;
    }
    let filename = field.file_name().unwrap_or("avatar").to_string();
    let content_type = field.content_type().map(str::to_string);
    if !content_type
      .as_deref()
      .is_some_and(|ct| ct.starts_with("image/"))
    {
      return Err(ApiError::BadRequest("avatar must be an image".into()));
    }
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::Upload(e.to_string()))?;
    file = Some(UploadedFile { filename, content_type, bytes: bytes.to_vec() });
  }

  let file =
    file.ok_or_else(|| ApiError::BadRequest("missing avatar field".into()))?;

  let url = state
    .files
    .upload(file, "avatars")
    .await
    .map_err(|e| ApiError::Upload(e.to_string()))?;

  let updated = state
    .store
    .set_avatar(user.applicant_id, url)
    .await
    .map_err(ApiError::store)?;

  if let Some(old) = current.avatar_url.as_deref() {
    delete_quietly(state.files.as_ref(), old).await;
  }

  Ok(Json(updated))
}
