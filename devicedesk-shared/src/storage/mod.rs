/// Blob storage for uploaded images
///
/// The [`BlobStore`] seam hides where uploaded bytes actually live. The
/// production implementation is [`DiskStore`], which writes files under an
/// upload root and returns a reference path that is persisted on the owning
/// entity and later used to read the bytes back.
///
/// Stored names follow `<field>-<millis><ext>` so successive uploads for the
/// same field do not collide across time and the original extension is kept
/// for content-type sniffing on the way out.
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Error type for blob storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying filesystem failure
    #[error("Blob write failed: {0}")]
    WriteFailed(#[from] std::io::Error),
}

/// Narrow binary-storage capability
///
/// `store` persists the bytes and returns a stable reference path; the path
/// is opaque to callers beyond being readable again later.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists an uploaded blob and returns its reference path
    ///
    /// `field` names the upload slot (e.g. `deviceImage`); `original_name`
    /// is the client-supplied filename, used only for its extension.
    async fn store(
        &self,
        field: &str,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError>;
}

/// On-disk [`BlobStore`] rooted at a configurable upload directory
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory blobs are written under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for DiskStore {
    async fn store(
        &self,
        field: &str,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let name = blob_name(field, original_name, Utc::now().timestamp_millis());
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(&name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored blob");
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Builds the stored file name: `<field>-<millis><ext>`
fn blob_name(field: &str, original_name: &str, millis: i64) -> String {
    let ext = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    format!("{}-{}{}", field, millis, ext)
}
