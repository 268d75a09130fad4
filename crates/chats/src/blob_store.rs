//! Blob storage for chat media.
//!
//! Messages only carry URLs; the bytes live behind this trait so tests
//! and deployments can swap the backing store.

use async_trait::async_trait;
use bytes::Bytes;
use campusgig_database::ChatError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Store for raw media bytes keyed by opaque URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `data` and return a URL that can be embedded in a message.
    /// `file_name` is only consulted for its extension.
    async fn put(&self, data: Bytes, file_name: &str) -> Result<String, ChatError>;

    /// Remove a blob previously returned by `put`. Unknown URLs are
    /// rejected rather than ignored.
    async fn delete(&self, url: &str) -> Result<(), ChatError>;
}

/// Filesystem-backed blob store. Blobs are written under a single root
/// directory with generated names, so user-supplied file names can never
/// escape it.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub async fn new(root: PathBuf) -> Result<Self, ChatError> {
        fs::create_dir_all(&root).await.map_err(|e| {
            ChatError::Storage(format!(
                "failed to create blob directory '{}': {e}",
                root.display()
            ))
        })?;

        info!(path = %root.display(), "blob store initialized");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored URL back to a path inside the root, rejecting
    /// anything that points elsewhere.
    fn resolve(&self, url: &str) -> Result<PathBuf, ChatError> {
        let path = url
            .strip_prefix("file://")
            .ok_or_else(|| ChatError::Storage(format!("unrecognized blob url: {url}")))?;
        let path = PathBuf::from(path);

        if !path.starts_with(&self.root) || path.components().any(|c| c.as_os_str() == "..") {
            return Err(ChatError::Storage(format!(
                "blob url outside store root: {url}"
            )));
        }
        Ok(path)
    }
}

fn sanitized_extension(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, data: Bytes, file_name: &str) -> Result<String, ChatError> {
        if data.is_empty() {
            return Err(ChatError::Storage("empty blob".to_string()));
        }

        let id = Uuid::new_v4();
        let stored_name = match sanitized_extension(file_name) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };
        let path = self.root.join(&stored_name);

        fs::write(&path, &data)
            .await
            .map_err(|e| ChatError::Storage(format!("failed to write blob {stored_name}: {e}")))?;

        debug!(blob = %stored_name, size = data.len(), "stored blob");
        Ok(format!("file://{}", path.display()))
    }

    async fn delete(&self, url: &str) -> Result<(), ChatError> {
        let path = self.resolve(url)?;

        if !path.exists() {
            return Err(ChatError::Storage(format!("blob not found: {url}")));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| ChatError::Storage(format!("failed to delete blob: {e}")))?;

        debug!(url = %url, "deleted blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (FsBlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let (store, _dir) = test_store().await;

        let url = store
            .put(Bytes::from_static(b"pixels"), "photo.png")
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with(".png"));

        store.delete(&url).await.unwrap();
        assert!(store.delete(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_blob_rejected() {
        let (store, _dir) = test_store().await;
        assert!(store.put(Bytes::new(), "empty.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_traversal_in_file_name_is_neutralized() {
        let (store, dir) = test_store().await;

        let url = store
            .put(Bytes::from_static(b"data"), "../../etc/passwd")
            .await
            .unwrap();
        // The blob landed inside the root under a generated name
        let path = url.strip_prefix("file://").unwrap();
        assert!(Path::new(path).starts_with(dir.path()));
    }

    #[tokio::test]
    async fn test_delete_rejects_foreign_urls() {
        let (store, _dir) = test_store().await;
        assert!(store.delete("file:///etc/passwd").await.is_err());
        assert!(store.delete("https://example.com/x.png").await.is_err());
    }
}
