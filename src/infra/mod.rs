use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::adapter::avatar::identicon::IdenticonGenerator;
use crate::adapter::crypto::jwt::JwtTokenVerifier;
use crate::adapter::storage::local::LocalStorageBackend;
use crate::adapter::storage::s3::S3StorageBackend;
use crate::application::interface::storage::StorageBackend;
use crate::infra::config::{AppConfig, StorageProvider};
use crate::infra::db::init_db;
use crate::infra::state::AppState;

pub mod app;
pub mod config;
pub mod db;
pub mod setup;
pub mod state;

pub async fn init_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match config.storage.provider {
        StorageProvider::S3 => {
            let s3_config = config.storage.s3.as_ref().context("missing [storage.s3] section")?;
            let backend = S3StorageBackend::new(s3_config);
            backend.ensure_bucket().await?;
            info!(bucket = %s3_config.bucket, "Using S3 avatar storage");
            Ok(Arc::new(backend))
        }
        StorageProvider::Local => {
            let local_config = config
                .storage
                .local
                .as_ref()
                .context("missing [storage.local] section")?;
            tokio::fs::create_dir_all(&local_config.directory).await?;
            info!(directory = %local_config.directory, "Using local avatar storage");
            Ok(Arc::new(LocalStorageBackend::new(local_config)))
        }
    }
}

pub fn build_app_state(config: &AppConfig, pool: PgPool, storage: Arc<dyn StorageBackend>) -> AppState {
    let secret_key = config.auth.secret_key.as_deref();
    if secret_key.is_none_or(str::is_empty) {
        warn!("auth.secret_key is not set, protected routes will answer 500");
    }

    AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        avatar_generator: Arc::new(IdenticonGenerator::new(&config.avatar)),
        token_verifier: Arc::new(JwtTokenVerifier::new(secret_key)),
    }
}

pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = init_db(config).await?;
    let storage = init_storage(config).await?;
    Ok(build_app_state(config, pool, storage))
}
