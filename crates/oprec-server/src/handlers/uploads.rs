//! Serving of stored uploads under `/uploads/{*path}`.

use axum::{
  extract::{Path, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use oprec_core::{
  files::FileStore, gateway::PaymentGateway, store::RecruitStore,
};

use crate::{AppState, error::ApiError, files::serving_path};

/// `GET /uploads/{*path}`
pub async fn serve<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  Path(path): Path<String>,
) -> Result<Response, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let file_path = serving_path(&state.config.upload_dir, &path)
    .ok_or_else(|| ApiError::NotFound("no such file".into()))?;

  let bytes = tokio::fs::read(&file_path)
    .await
    .map_err(|_| ApiError::NotFound("no such file".into()))?;

  let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
  Ok(
    (
      StatusCode::OK,
      [(header::CONTENT_TYPE, mime.as_ref().to_string())],
      bytes,
    )
      .into_response(),
  )
}
