//! Password hashing, bearer tokens, and the request extractors that gate
//! handlers on authentication and role.
//!
//! Tokens are self-contained: a base64 JSON claims payload joined to a
//! keyed SHA-256 tag over it. Verification recomputes the tag and checks
//! the expiry, so no token state is held server-side.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::{Duration, Utc};
use oprec_core::{
  applicant::{Applicant, Role},
  files::FileStore,
  gateway::PaymentGateway,
  store::RecruitStore,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Token signing material and lifetime for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub token_secret: String,
  pub token_ttl:    Duration,
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))
}

/// Verify a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:   Uuid,
  pub email: String,
  pub role:  Role,
  /// Expiry as a unix timestamp (seconds).
  pub exp:   i64,
}

fn tag(secret: &str, payload: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(secret.as_bytes());
  hasher.update(b".");
  hasher.update(payload.as_bytes());
  hex::encode(hasher.finalize())
}

/// Issue a token for an authenticated applicant.
pub fn issue_token(
  applicant: &Applicant,
  auth:      &AuthConfig,
) -> Result<String, ApiError> {
  let claims = Claims {
    sub:   applicant.applicant_id,
    email: applicant.email.clone(),
    role:  applicant.role,
    exp:   (Utc::now() + auth.token_ttl).timestamp(),
  };
  let json = serde_json::to_vec(&claims)
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let payload = B64.encode(json);
  let sig = tag(&auth.token_secret, &payload);
  Ok(format!("{payload}.{sig}"))
}

/// Verify a token's tag and expiry, returning its claims.
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
  let (payload, sig) = token.split_once('.')?;
  if tag(secret, payload) != sig {
    return None;
  }
  let json = B64.decode(payload).ok()?;
  let claims: Claims = serde_json::from_slice(&json).ok()?;
  if claims.exp <= Utc::now().timestamp() {
    return None;
  }
  Some(claims)
}

fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;
  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized)?;
  verify_token(token, secret).ok_or(ApiError::Unauthorized)
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The authenticated caller. Present in a handler's arguments means the
/// request carried a valid, unexpired bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub applicant_id: Uuid,
  pub email:        String,
  pub role:         Role,
}

impl<S, G, F> FromRequestParts<AppState<S, G, F>> for CurrentUser
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, G, F>,
  ) -> Result<Self, Self::Rejection> {
    let claims = bearer_claims(&parts.headers, &state.auth.token_secret)?;
    Ok(CurrentUser {
      applicant_id: claims.sub,
      email:        claims.email,
      role:         claims.role,
    })
  }
}

/// Like [`CurrentUser`], but rejects non-admin callers with 403.
#[derive(Debug, Clone)]
pub struct AdminOnly(pub CurrentUser);

impl<S, G, F> FromRequestParts<AppState<S, G, F>> for AdminOnly
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, G, F>,
  ) -> Result<Self, Self::Rejection> {
    let user = CurrentUser::from_request_parts(parts, state).await?;
    if !user.role.is_admin() {
      return Err(ApiError::Forbidden);
    }
    Ok(AdminOnly(user))
  }
}
