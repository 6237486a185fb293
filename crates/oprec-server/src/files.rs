//! Disk-backed implementation of [`FileStore`].
//!
//! Uploads land under `<root>/<folder>/<uuid>-<name>` and are served back
//! via `/uploads/{*path}`. Stored names are sanitised so a returned URL can
//! never point outside the upload root.

use std::path::{Path, PathBuf};

use oprec_core::files::{FileStore, UploadedFile};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FileError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("not an upload url: {0}")]
  InvalidUrl(String),
}

#[derive(Clone)]
pub struct DiskFileStore {
  root: PathBuf,
}

impl DiskFileStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

/// Keep only characters safe in a stored filename.
fn sanitize(name: &str) -> String {
  let cleaned: String = name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();
  if cleaned.trim_matches('.').is_empty() {
    "file".to_string()
  } else {
    cleaned
  }
}

/// Resolve an `/uploads/...` URL to a path relative to the root, refusing
/// anything that could escape it.
pub fn relative_upload_path(url_or_path: &str) -> Option<&str> {
  let rel = url_or_path.strip_prefix("/uploads/")?;
  if rel.is_empty()
    || rel.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
  {
    return None;
  }
  Some(rel)
}

impl FileStore for DiskFileStore {
  type Error = FileError;

  async fn upload(
    &self,
    file:   UploadedFile,
    folder: &str,
  ) -> Result<String, FileError> {
    let name = format!("{}-{}", Uuid::new_v4().simple(), sanitize(&file.filename));
    let dir = self.root.join(folder);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&name), &file.bytes).await?;
    Ok(format!("/uploads/{folder}/{name}"))
  }

  async fn delete(&self, url: &str) -> Result<(), FileError> {
    let rel = relative_upload_path(url)
      .ok_or_else(|| FileError::InvalidUrl(url.to_string()))?;
    tokio::fs::remove_file(self.root.join(rel)).await?;
    Ok(())
  }
}

/// Best-effort removal of a stored blob; failures are logged, not returned.
pub async fn delete_quietly<F: FileStore>(files: &F, url: &str) {
  if let Err(e) = files.delete(url).await {
    tracing::warn!(url, error = %e, "failed to delete stored file");
  }
}

/// Absolute path for serving a previously stored file, or `None` when the
/// request path is not a safe upload path.
pub fn serving_path(root: &Path, request_path: &str) -> Option<PathBuf> {
  // The router hands us the path without the /uploads/ prefix.
  let url = format!("/uploads/{request_path}");
  relative_upload_path(&url).map(|rel| root.join(rel))
}
