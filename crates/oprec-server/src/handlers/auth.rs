//! Handlers for `/api/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/register` | Creates applicant + profile, returns a token |
//! | `POST` | `/api/auth/login` | Returns a token on valid credentials |
//! | `GET` | `/api/auth/me` | The authenticated applicant, sans hash |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use oprec_core::{
  applicant::{Applicant, Registration, Role},
  files::FileStore,
  gateway::PaymentGateway,
  store::RecruitStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, auth, auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:     String,
  pub password:  String,
  pub full_name: String,
  pub nim:       String,
}

fn validate_register(body: &RegisterBody) -> Result<(), ApiError> {
  if !body.email.contains('@') || body.email.len() < 3 {
    return Err(ApiError::BadRequest("invalid email address".into()));
  }
  if body.password.len() < 8 {
    return Err(ApiError::BadRequest(
      "password must be at least 8 characters".into(),
    ));
  }
  if body.full_name.trim().is_empty() {
    return Err(ApiError::BadRequest("full_name must not be empty".into()));
  }
  if body.nim.trim().is_empty() {
    return Err(ApiError::BadRequest("nim must not be empty".into()));
  }
  Ok(())
}

/// `POST /api/auth/register`
pub async fn register<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  validate_register(&body)?;

  // Friendly 409s; the store's unique constraints close the race.
  if state
    .store
    .applicant_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict("email is already registered".into()));
  }
  if state
    .store
    .profile_by_nim(&body.nim)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict("nim is already registered".into()));
  }

  let password_hash = auth::hash_password(&body.password)?;
  let applicant = state
    .store
    .register_applicant(Registration {
      email: body.email,
      password_hash,
      role: Role::Applicant,
      full_name: body.full_name,
      nim: body.nim,
    })
    .await
    .map_err(ApiError::store)?;

  let token = auth::issue_token(&applicant, &state.auth)?;
  tracing::info!(applicant_id = %applicant.applicant_id, "applicant registered");

  Ok((
    StatusCode::CREATED,
    Json(json!({ "token": token, "applicant": applicant })),
  ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /api/auth/login`
pub async fn login<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  // One error for both unknown email and wrong password.
  let applicant = state
    .store
    .applicant_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  if !auth::verify_password(&body.password, &applicant.password_hash) {
    return Err(ApiError::Unauthorized);
  }

  let token = auth::issue_token(&applicant, &state.auth)?;
  Ok(Json(json!({ "token": token, "applicant": applicant })))
}

/// `GET /api/auth/me`
pub async fn me<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
) -> Result<Json<Applicant>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  // A valid token can outlive its row; answer 404 rather than 500.
  let applicant = state
    .store
    .applicant(user.applicant_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("applicant not found".into()))?;
  Ok(Json(applicant))
}
