//! Media storage abstraction for uploaded images.
//!
//! Keys are forward-slash separated relative paths such as
//! `terms/ifr/cockpit.jpg`. Derived image variants live next to their
//! original (see [`variant_key`]).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (relative path).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file, overwriting any existing object at `key`.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Read a file's bytes.
    async fn read(&self, key: &str) -> AppResult<Vec<u8>>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Shared handle to a storage backend.
pub type StorageService = Arc<dyn StorageBackend>;

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(AppError::Storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        Ok(uploaded(key, self.public_url(key), data, content_type))
    }

    async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read file {key}: {e}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.path_for(key)?;
        Ok(path.exists())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// In-memory storage backend, used by tests.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    base_url: String,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            files: Arc::default(),
            base_url: base_url.into(),
        }
    }

    /// List stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        self.files
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(uploaded(key, self.public_url(key), data, content_type))
    }

    async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("No such file: {key}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.files.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.files.read().await.contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

fn uploaded(key: &str, url: String, data: &[u8], content_type: &str) -> UploadedFile {
    UploadedFile {
        key: key.to_string(),
        url,
        size: data.len() as u64,
        content_type: content_type.to_string(),
        md5: format!("{:x}", md5::compute(data)),
    }
}

/// Split a key into its root (everything before the final extension) and
/// extension (without the dot, possibly empty).
#[must_use]
pub fn split_extension(key: &str) -> (&str, &str) {
    let name_start = key.rfind('/').map_or(0, |i| i + 1);
    match key[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            (&key[..dot], &key[dot + 1..])
        }
        _ => (key, ""),
    }
}

/// Key of the WebP variant of `key` at `width` pixels.
#[must_use]
pub fn variant_key(key: &str, width: u32) -> String {
    let (root, _) = split_extension(key);
    format!("{root}_w{width}.webp")
}

/// Final path segment of a key.
#[must_use]
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Reduce an uploaded file name to a safe single path segment.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned.to_string()
    }
}
