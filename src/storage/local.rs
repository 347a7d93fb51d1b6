//! Filesystem-backed object storage (one directory per bucket)

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use super::ObjectStorage;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct LocalStorage {
    bucket_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>, bucket: &str) -> Self {
        Self {
            bucket_dir: root.as_ref().join(bucket),
        }
    }

    /// Create the bucket directory if missing
    pub async fn init(&self) -> AppResult<()> {
        fs::create_dir_all(&self.bucket_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot create bucket directory: {}", e)))
    }

    /// Map an object path to a file inside the bucket, refusing traversal
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(AppError::BadRequest(format!("Invalid object path: {}", path)));
        }
        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> AppResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    AppError::Conflict(format!("Object {} already exists", path))
                }
                _ => AppError::Storage(e.to_string()),
            })?;

        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            // Do not leave a truncated object behind
            let _ = fs::remove_file(&target).await;
            return Err(AppError::Storage(e.to_string()));
        }

        tracing::debug!("Stored object {} ({} bytes)", path, bytes.len());
        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> AppResult<Vec<u8>> {
        let target = self.resolve(path)?;
        fs::read(&target).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(format!("Object {} not found", path)),
            _ => AppError::Storage(e.to_string()),
        })
    }

    async fn remove(&self, paths: Vec<String>) -> AppResult<()> {
        for path in paths {
            let target = self.resolve(&path)?;
            match fs::remove_file(&target).await {
                Ok(()) => tracing::debug!("Removed object {}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::Storage(e.to_string())),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_download_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "book-covers");
        storage.init().await.unwrap();

        let path = storage
            .upload("covers/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(path, "covers/a.png");
        assert_eq!(storage.download("covers/a.png").await.unwrap(), vec![1, 2, 3]);

        storage.remove(vec!["covers/a.png".to_string()]).await.unwrap();
        assert!(matches!(
            storage.download("covers/a.png").await,
            Err(AppError::NotFound(_))
        ));

        // Removing again is not an error
        storage.remove(vec!["covers/a.png".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "book-covers");

        storage.upload("covers/a.png", vec![1], "image/png").await.unwrap();
        let second = storage.upload("covers/a.png", vec![2], "image/png").await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(storage.download("covers/a.png").await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "book-covers");

        for path in ["../secret", "/etc/passwd", "covers/../../x", ""] {
            assert!(matches!(
                storage.upload(path, vec![0], "image/png").await,
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
