use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapter::storage::blob_extension;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::storage::StorageBackend;
use crate::infra::config::LocalStorageConfig;

const MAX_STEM_LEN: usize = 64;

/// Stores avatars as plain files; the directory is served statically under `url_prefix`.
pub struct LocalStorageBackend {
    directory: PathBuf,
    url_prefix: String,
}

impl LocalStorageBackend {
    pub fn new(config: &LocalStorageConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn file_name(suggested_name: &str, content_type: &str) -> String {
        let stem = suggested_name
            .rsplit_once('.')
            .map_or(suggested_name, |(stem, _)| stem);
        let mut stem: String = stem
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(MAX_STEM_LEN)
            .collect();
        if stem.is_empty() {
            stem.push_str("avatar");
        }

        format!(
            "{}_{}.{}",
            stem,
            Uuid::now_v7().simple(),
            blob_extension(suggested_name, content_type)
        )
    }

    fn file_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.url_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| {
                !name.is_empty() && !name.contains(['/', '\\']) && *name != "." && *name != ".."
            })
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    async fn put(&self, data: Bytes, suggested_name: &str, content_type: &str) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        let file_name = Self::file_name(suggested_name, content_type);
        let path = self.directory.join(&file_name);

        tokio::fs::write(&path, &data).await.map_err(|e| {
            warn!("Local upload error path={}: {:?}", path.display(), e);
            AppError::StorageError(e.to_string())
        })?;

        info!("Stored {}", path.display());
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let file_name = self
            .file_from_url(url)
            .ok_or_else(|| AppError::StorageError(format!("URL is not a local upload: {}", url)))?;
        let path = self.directory.join(file_name);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Local delete error path={}: {:?}", path.display(), e);
                Err(AppError::StorageError(e.to_string()))
            }
        }
    }
}
