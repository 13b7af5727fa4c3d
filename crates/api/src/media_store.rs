//! Local-disk implementation of [`MediaStore`].
//!
//! Files land under `<root>/<kind folder>/<uuid>.<ext>`; the storage key is
//! the path relative to the root and is resolved against the public URL
//! prefix the directory is served under.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use vrtour_core::error::CoreError;
use vrtour_core::media::{MediaKind, MediaStore, MediaUpload};

/// Stores uploads in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Absolute path of a key, refusing anything that would escape the root.
    fn path_of(&self, key: &str) -> Result<PathBuf, CoreError> {
        let relative = Path::new(key);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !confined {
            return Err(CoreError::Internal(format!("Invalid media key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, kind: MediaKind, upload: &MediaUpload) -> Result<String, CoreError> {
        let key = format!(
            "{}{}{}",
            kind.folder(),
            uuid::Uuid::new_v4().simple(),
            extension_of(&upload.file_name)
        );
        let path = self.path_of(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Internal(format!("Failed to create media dir: {e}")))?;
        }
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to write media file: {e}")))?;

        tracing::debug!(key = %key, bytes = upload.size(), "Stored media file");
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_of(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Internal(format!(
                "Failed to delete media file {key}: {e}"
            ))),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}{key}", self.base_url)
    }
}

/// Lower-cased `.ext` of an uploaded file name, or empty when it has none
/// (or an unusable one).
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Best-effort removal of stored keys; failures are logged, not returned.
pub async fn discard(store: &dyn MediaStore, keys: &[String]) {
    for key in keys {
        if let Err(e) = store.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to remove media file");
        }
    }
}
