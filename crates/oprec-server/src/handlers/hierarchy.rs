//! Handlers for the `/api/hierarchy` catalog endpoints. Read-only;
//! listings come back sorted by name.

use axum::{
  Json,
  extract::{Path, State},
};
use oprec_core::{
  files::FileStore,
  gateway::PaymentGateway,
  hierarchy::{Department, Division, SubDivision},
  store::RecruitStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `GET /api/hierarchy/departments`
pub async fn departments<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _user: CurrentUser,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let departments =
    state.store.departments().await.map_err(ApiError::store)?;
  Ok(Json(departments))
}

/// `GET /api/hierarchy/departments/{id}/divisions`
pub async fn divisions<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Division>>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let divisions = state.store.divisions(id).await.map_err(ApiError::store)?;
  Ok(Json(divisions))
}

/// `GET /api/hierarchy/divisions/{id}/sub-divisions`
pub async fn sub_divisions<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<SubDivision>>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let subs = state.store.sub_divisions(id).await.map_err(ApiError::store)?;
  Ok(Json(subs))
}
