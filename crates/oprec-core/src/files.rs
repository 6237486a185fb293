//! The `FileStore` trait — the uploaded-document storage seam.

use std::future::Future;

/// An uploaded file as received at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub filename:     String,
  pub content_type: Option<String>,
  pub bytes:        Vec<u8>,
}

/// Abstraction over blob storage for uploaded documents.
///
/// Uploads are not transactional with the database write that records the
/// returned URL; an orphaned blob after a failed write is an accepted
/// leak. Deletion is best-effort and callers swallow its failures.
pub trait FileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `file` under `folder` and return its public URL.
  fn upload<'a>(
    &'a self,
    file:   UploadedFile,
    folder: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Remove the blob behind a previously returned URL.
  fn delete<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
