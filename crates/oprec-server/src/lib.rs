//! HTTP layer for the oprec recruitment backend.
//!
//! Exposes an axum [`Router`] over any [`RecruitStore`], [`PaymentGateway`],
//! and [`FileStore`] implementation. Handlers own the workflow gating
//! (profile → verification → payment); the store enforces the same rules
//! again as race backstops.

pub mod auth;
pub mod error;
pub mod files;
pub mod gateway;
pub mod handlers;

#[cfg(test)]
mod tests;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use oprec_core::{
  files::FileStore, gateway::PaymentGateway, store::RecruitStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Where the provider sends the applicant after the payment flow.
  pub frontend_url:       String,
  pub store_path:         PathBuf,
  pub upload_dir:         PathBuf,
  pub token_secret:       String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:    i64,
  /// Registration fee in the provider's smallest currency unit.
  pub registration_fee:   i64,
  pub gateway_base_url:   String,
  pub gateway_server_key: String,
  /// Created on `--seed` when both are set.
  #[serde(default)]
  pub admin_email:        Option<String>,
  #[serde(default)]
  pub admin_password:     Option<String>,
}

fn default_token_ttl_hours() -> i64 { 24 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, G, F> {
  pub store:   Arc<S>,
  pub gateway: Arc<G>,
  pub files:   Arc<F>,
  pub config:  Arc<ServerConfig>,
  pub auth:    Arc<AuthConfig>,
}

impl<S, G, F> Clone for AppState<S, G, F> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      gateway: Arc::clone(&self.gateway),
      files:   Arc::clone(&self.files),
      config:  Arc::clone(&self.config),
      auth:    Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, G, F>(state: AppState<S, G, F>) -> Router
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  Router::new()
    // Auth
    .route("/api/auth/register", post(handlers::auth::register::<S, G, F>))
    .route("/api/auth/login", post(handlers::auth::login::<S, G, F>))
    .route("/api/auth/me", get(handlers::auth::me::<S, G, F>))
    // Profile
    .route(
      "/api/profile/me",
      get(handlers::profile::me::<S, G, F>)
        .patch(handlers::profile::update::<S, G, F>),
    )
    .route(
      "/api/profile/me/avatar",
      post(handlers::profile::avatar::<S, G, F>),
    )
    // Hierarchy catalog
    .route(
      "/api/hierarchy/departments",
      get(handlers::hierarchy::departments::<S, G, F>),
    )
    .route(
      "/api/hierarchy/departments/{id}/divisions",
      get(handlers::hierarchy::divisions::<S, G, F>),
    )
    .route(
      "/api/hierarchy/divisions/{id}/sub-divisions",
      get(handlers::hierarchy::sub_divisions::<S, G, F>),
    )
    // Verification
    .route(
      "/api/verification/me",
      get(handlers::verification::me::<S, G, F>),
    )
    .route(
      "/api/verification/submit",
      post(handlers::verification::submit::<S, G, F>),
    )
    .route(
      "/api/verification/admin/list",
      get(handlers::verification::admin_list::<S, G, F>),
    )
    .route(
      "/api/verification/admin/review/{id}",
      axum::routing::patch(handlers::verification::review::<S, G, F>),
    )
    // Payments
    .route(
      "/api/payments/create",
      post(handlers::payment::create::<S, G, F>),
    )
    .route(
      "/api/payments/webhook",
      post(handlers::payment::webhook::<S, G, F>),
    )
    .route(
      "/api/payments/admin/list",
      get(handlers::payment::admin_list::<S, G, F>),
    )
    // Dashboard
    .route("/api/dashboard/me", get(handlers::dashboard::me::<S, G, F>))
    // Timeline
    .route(
      "/api/timeline",
      get(handlers::timeline::list::<S, G, F>)
        .post(handlers::timeline::create::<S, G, F>),
    )
    .route(
      "/api/timeline/{id}",
      axum::routing::patch(handlers::timeline::update::<S, G, F>)
        .delete(handlers::timeline::remove::<S, G, F>),
    )
    // Stored uploads
    .route("/uploads/{*path}", get(handlers::uploads::serve::<S, G, F>))
    .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
