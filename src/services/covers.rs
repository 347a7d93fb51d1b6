//! Cover image upload, URL resolution and cleanup

use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    models::book::{Book, BookSummary},
    storage::{ObjectStorage, UrlSigner},
};

pub const ACCEPTED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

const COVERS_PREFIX: &str = "covers";

/// Image received from a multipart form
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stored cover location
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredCover {
    pub path: String,
    pub url: String,
}

#[derive(Clone)]
pub struct CoverService {
    storage: Arc<dyn ObjectStorage>,
    signer: UrlSigner,
    signed_urls: bool,
    ttl_secs: u64,
    max_upload_bytes: usize,
}

impl CoverService {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: &StorageConfig) -> Self {
        Self {
            storage,
            signer: UrlSigner::new(&config.public_base_url, &config.bucket, &config.signing_secret),
            signed_urls: config.signed_urls,
            ttl_secs: config.signed_url_ttl_secs,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    /// Reject anything that is not a supported image within the size limit
    pub fn validate_image(&self, content_type: &str, size: usize) -> AppResult<()> {
        if !ACCEPTED_IMAGE_TYPES.contains(&content_type.to_lowercase().as_str()) {
            return Err(AppError::Validation(
                "Please upload a valid image file (JPEG, PNG, GIF or WebP)".to_string(),
            ));
        }
        if size > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "Image size cannot exceed {} MB",
                self.max_upload_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Validate and store an image under a fresh `covers/` path
    pub async fn upload_cover(&self, upload: CoverUpload) -> AppResult<StoredCover> {
        self.validate_image(&upload.content_type, upload.bytes.len())?;

        let path = new_cover_path(&upload.file_name, &upload.content_type);
        let path = self
            .storage
            .upload(&path, upload.bytes, &upload.content_type)
            .await?;

        tracing::info!("Uploaded cover {}", path);
        let url = self.url_for_path(&path);
        Ok(StoredCover { path, url })
    }

    fn url_for_path(&self, path: &str) -> String {
        if self.signed_urls {
            self.signer.signed_url(path, self.ttl_secs, Utc::now().timestamp())
        } else {
            self.signer.public_url(path)
        }
    }

    /// Turn a stored cover reference into a fetchable URL.
    /// Absolute URLs are returned unchanged.
    pub fn resolve_url(&self, reference: Option<&str>) -> Option<String> {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;
        if is_absolute_url(reference) {
            Some(reference.to_string())
        } else {
            Some(self.url_for_path(reference))
        }
    }

    pub fn resolve_book(&self, mut book: Book) -> Book {
        book.cover_url = self.resolve_url(book.cover_image_url.as_deref());
        book
    }

    pub fn resolve_summary(&self, summary: &mut BookSummary) {
        summary.cover_url = self.resolve_url(summary.cover_image_url.as_deref());
    }

    /// Storage path behind a cover reference, if it points into our bucket
    pub fn stored_path(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            None
        } else if is_absolute_url(reference) {
            self.signer.path_from_url(reference)
        } else {
            Some(reference.to_string())
        }
    }

    /// Remove the object behind a cover reference. Failures are logged, not returned.
    pub async fn discard(&self, reference: Option<&str>) -> bool {
        let Some(path) = reference.and_then(|r| self.stored_path(r)) else {
            return true;
        };

        match self.storage.remove(vec![path.clone()]).await {
            Ok(()) => {
                tracing::info!("Removed cover {}", path);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to remove cover {}: {}", path, e);
                false
            }
        }
    }
}

fn is_absolute_url(reference: &str) -> bool {
    let lower = reference.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `covers/{unix_millis}-{random}.{ext}`
fn new_cover_path(file_name: &str, content_type: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| extension_for(content_type).to_string());

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    format!(
        "{}/{}-{}.{}",
        COVERS_PREFIX,
        Utc::now().timestamp_millis(),
        suffix,
        ext
    )
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
