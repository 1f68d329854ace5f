//! The flat upload directory.

use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Extension used when an upload has no usable one.
const FALLBACK_EXTENSION: &str = "bin";

/// A file written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated id (the filename stem)
    pub id: String,
    pub filename: String,
    pub path: PathBuf,
    /// Public path, e.g. `/uploads/<filename>`
    pub public_path: String,
}

/// Stores bytes under generated names in one flat directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    config: StorageConfig,
}

impl UploadStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.upload_dir
    }

    /// Create the upload directory if it does not exist.
    pub async fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.config.upload_dir)
            .await
            .map_err(|e| {
                StorageError::config_error(format!(
                    "cannot create upload dir {}: {}",
                    self.config.upload_dir.display(),
                    e
                ))
            })
    }

    /// Save an upload, keeping the extension of `original_name` when it has a
    /// safe one.
    pub async fn save(&self, bytes: &[u8], original_name: Option<&str>) -> StorageResult<StoredFile> {
        let ext = original_name
            .and_then(|name| Path::new(name).extension())
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| is_safe_extension(e))
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
        self.save_with_extension(bytes, &ext).await
    }

    /// Save bytes under a fresh id with extension `ext`.
    pub async fn save_with_extension(&self, bytes: &[u8], ext: &str) -> StorageResult<StoredFile> {
        let ext = ext.trim_start_matches('.');
        if !is_safe_extension(ext) {
            return Err(StorageError::invalid_key(format!("extension '{}'", ext)));
        }

        self.ensure_root().await?;
        let id = Uuid::new_v4().to_string();
        let filename = format!("{}.{}", id, ext);
        let path = self.config.upload_dir.join(&filename);
        fs::write(&path, bytes).await?;

        info!(filename = %filename, bytes = bytes.len(), "Stored file");
        Ok(StoredFile {
            id,
            public_path: self.public_path(&filename),
            filename,
            path,
        })
    }

    /// Public path for a stored filename.
    pub fn public_path(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_prefix.trim_end_matches('/'),
            filename
        )
    }

    /// Map a public URL or path (`.../uploads/<filename>`) to the stored file.
    ///
    /// Only a single plain filename is accepted after the prefix.
    pub fn resolve(&self, url: &str) -> StorageResult<PathBuf> {
        let marker = format!("{}/", self.config.public_prefix.trim_end_matches('/'));
        let name = url
            .rsplit_once(marker.as_str())
            .map(|(_, rest)| rest)
            .unwrap_or(url);
        let name = name.split(['?', '#']).next().unwrap_or_default();

        let mut components = Path::new(name).components();
        let filename = match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => part.to_owned(),
            _ => return Err(StorageError::invalid_key(url.to_string())),
        };

        let path = self.config.upload_dir.join(filename);
        if !path.is_file() {
            return Err(StorageError::not_found(name.to_string()));
        }
        debug!(url, path = %path.display(), "Resolved stored file");
        Ok(path)
    }

    /// Read the bytes of the stored file behind `url`.
    pub async fn read(&self, url: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(url)?;
        Ok(fs::read(path).await?)
    }
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(StorageConfig::default().with_upload_dir(dir))
    }

    #[tokio::test]
    async fn test_save_keeps_extension() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let stored = store.save(b"png bytes", Some("Selfie.PNG")).await.unwrap();
        assert_eq!(stored.filename, format!("{}.png", stored.id));
        assert_eq!(stored.public_path, format!("/uploads/{}", stored.filename));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_save_falls_back_to_bin() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        for name in [None, Some("noext"), Some("evil.p/hp"), Some("x.verylongextension")] {
            let stored = store.save(b"x", name).await.unwrap();
            assert!(stored.filename.ends_with(".bin"), "{name:?}");
        }
    }

    #[tokio::test]
    async fn test_save_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir.path().join("nested"));
        let stored = store.save_with_extension(b"mp3", ".mp3").await.unwrap();
        assert!(stored.path.exists());
    }

    #[tokio::test]
    async fn test_resolve_round_trips_public_urls() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());
        let stored = store.save(b"img", Some("a.jpg")).await.unwrap();

        let absolute = format!("http://localhost:8000{}", stored.public_path);
        assert_eq!(store.resolve(&absolute).unwrap(), stored.path);
        assert_eq!(store.resolve(&stored.public_path).unwrap(), stored.path);
        assert_eq!(store.resolve(&stored.filename).unwrap(), stored.path);
        assert_eq!(store.read(&absolute).await.unwrap(), b"img");
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        for url in [
            "http://host/uploads/../secret.txt",
            "/uploads/a/b.png",
            "/uploads/",
            "/etc/passwd",
        ] {
            assert!(
                matches!(store.resolve(url), Err(StorageError::InvalidKey(_))),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());
        assert!(matches!(
            store.resolve("/uploads/nope.png"),
            Err(StorageError::NotFound(_))
        ));
    }
}
