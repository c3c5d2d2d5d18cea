// ABOUTME: Blob storage for photo bytes behind an async trait
// ABOUTME: Local filesystem store for deployments, in-memory store for tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Photo blob storage
//!
//! Blobs are addressed by the public URL returned from [`BlobStore::put`]. Upload
//! validation happens before a store is ever called.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use accountability_core::models::{MemberId, PhotoFormat};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::environment::PhotoStorageConfig;
use crate::errors::{AppError, AppResult};

/// Storage for uploaded photo bytes
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` for `owner` and return the public URL
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the blob cannot be written
    async fn put(&self, owner: &MemberId, format: PhotoFormat, bytes: Bytes) -> AppResult<String>;

    /// Remove the blob behind `url`; missing blobs are not an error
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the blob exists but cannot be removed
    async fn delete(&self, url: &str) -> AppResult<()>;
}

/// Directory name for an owner's blobs
///
/// Ids made of ASCII alphanumerics, `-` and `_` are used as is. Anything else is
/// hex-encoded behind a `~` prefix so the segment can never leave the store root.
fn owner_segment(owner: &MemberId) -> String {
    let id = owner.as_str();
    if id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        id.to_owned()
    } else {
        format!("~{}", hex::encode(id))
    }
}

/// Build the object key `owner/uuid.ext`
fn object_key(owner: &MemberId, format: PhotoFormat) -> String {
    format!(
        "{}/{}.{}",
        owner_segment(owner),
        Uuid::new_v4(),
        format.extension()
    )
}

/// Writes blobs under a directory and serves them from `public_base_url`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Create a store from configuration
    #[must_use]
    pub fn from_config(config: &PhotoStorageConfig) -> Self {
        Self::new(&config.storage_dir, &config.public_base_url)
    }

    /// Directory blobs are written to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a public URL back to its file, refusing anything outside the root
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let key = url
            .strip_prefix(&self.public_base_url)?
            .trim_start_matches('/');
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return None;
        }
        Some(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, owner: &MemberId, format: PhotoFormat, bytes: Bytes) -> AppResult<String> {
        let key = object_key(owner, format);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage_unavailable(format!("Failed to create photo directory: {e}"))
            })?;
        }
        fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::storage_unavailable(format!("Failed to write photo: {e}")))?;

        debug!(path = %path.display(), size = bytes.len(), "Stored photo blob");
        Ok(format!("{}/{key}", self.public_base_url))
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let Some(path) = self.path_for_url(url) else {
            warn!(url, "Photo URL is outside the local blob store; nothing to delete");
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage_unavailable(format!(
                "Failed to delete photo: {e}"
            ))),
        }
    }
}

/// Keeps blobs in a map; used by tests and the in-memory deployment mode
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `url`
    pub async fn get(&self, url: &str) -> Option<Bytes> {
        self.blobs.read().await.get(url).cloned()
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, owner: &MemberId, format: PhotoFormat, bytes: Bytes) -> AppResult<String> {
        let url = format!("memory://{}", object_key(owner, format));
        self.blobs.write().await.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        self.blobs.write().await.remove(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/photos/");
        let owner = MemberId::new("alice").unwrap();

        let url = store
            .put(&owner, PhotoFormat::Png, Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert!(url.starts_with("/photos/alice/"));
        assert!(url.ends_with(".png"));

        let path = store.path_for_url(&url).unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"png");

        store.delete(&url).await.unwrap();
        assert!(!path.exists());
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_hostile_member_ids_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("photos");
        let store = LocalBlobStore::new(&root, "/photos");

        for raw in ["../escaped", "/abs", "a/b", "..", "back\\slash", "dots.."] {
            let owner = MemberId::new(raw).unwrap();
            let url = store
                .put(&owner, PhotoFormat::Png, Bytes::from_static(b"png"))
                .await
                .unwrap();

            let path = store.path_for_url(&url).unwrap();
            assert!(path.starts_with(&root), "{raw} escaped to {}", path.display());
            assert!(path.exists());

            store.delete(&url).await.unwrap();
            assert!(!path.exists());
        }

        let mut outside = dir.path().read_dir().unwrap();
        assert_eq!(outside.next().unwrap().unwrap().file_name(), "photos");
        assert!(outside.next().is_none());
    }

    #[test]
    fn test_owner_segment_is_injective_for_encoded_ids() {
        let plain = MemberId::new("alice").unwrap();
        let dotted = MemberId::new("alice.smith").unwrap();
        assert_eq!(owner_segment(&plain), "alice");
        assert_eq!(owner_segment(&dotted), format!("~{}", hex::encode("alice.smith")));
        assert_ne!(owner_segment(&dotted), owner_segment(&plain));
    }

    #[test]
    fn test_path_traversal_is_refused() {
        let store = LocalBlobStore::new("/tmp/photos", "/photos");
        assert!(store.path_for_url("/photos/../etc/passwd").is_none());
        assert!(store.path_for_url("/elsewhere/a.png").is_none());
        assert!(store.path_for_url("/photos/").is_none());
    }
}
