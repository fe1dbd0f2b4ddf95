use async_trait::async_trait;
use bytes::Bytes;

use crate::application::app_error::AppResult;

/// Blob store for avatar images.
///
/// `put` returns a URL the backend can later resolve again in `delete`;
/// callers treat it as an opaque string.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn put(&self, data: Bytes, suggested_name: &str, content_type: &str) -> AppResult<String>;
    async fn delete(&self, url: &str) -> AppResult<()>;
}
