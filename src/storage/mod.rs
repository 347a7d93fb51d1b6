//! Object storage for book cover images
//!
//! Objects are addressed by a bucket-relative path such as
//! `covers/1718000000000-k3j9x2.png`. [`UrlSigner`] turns a path into a public
//! or time-limited signed URL and back.

pub mod local;
pub mod signer;

use async_trait::async_trait;

use crate::error::AppResult;

pub use local::LocalStorage;
pub use signer::UrlSigner;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store a new object; an existing object at `path` is a conflict
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String>;
    async fn download(&self, path: &str) -> AppResult<Vec<u8>>;
    /// Remove objects; paths that do not exist are ignored
    async fn remove(&self, paths: Vec<String>) -> AppResult<()>;
}

/// MIME type served for a stored object, from its extension
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
