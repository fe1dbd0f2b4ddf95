use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapter::storage::blob_extension;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::storage::StorageBackend;
use crate::infra::config::S3Config;

pub struct S3StorageBackend {
    client: Client,
    bucket: String,
    prefix: String,
    public_url: String,
}

impl S3StorageBackend {
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(&config.access_key, &config.secret_key, None, None, "profile-service");
        let s3_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let public_url = config
            .public_url
            .clone()
            .unwrap_or_else(|| config.endpoint.clone());

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            prefix: config.prefix.trim_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_key(&self, ext: &str) -> String {
        let name = format!("{}.{}", Uuid::now_v7(), ext);
        if self.prefix.is_empty() {
            name
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.bucket, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| rest.strip_prefix(self.bucket.as_str()))
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }

    /// Creates the bucket when missing and opens it for anonymous reads,
    /// since avatar URLs are handed out to browsers as-is.
    pub async fn ensure_bucket(&self) -> AppResult<()> {
        let bucket = self.bucket.as_str();

        if self.client.head_bucket().bucket(bucket).send().await.is_err() {
            match self.client.create_bucket().bucket(bucket).send().await {
                Ok(_) => info!("Bucket '{}' created", bucket),
                Err(SdkError::ServiceError(err)) => match err.err() {
                    CreateBucketError::BucketAlreadyExists(_) | CreateBucketError::BucketAlreadyOwnedByYou(_) => {}
                    other => {
                        warn!("Failed to create bucket '{}': {:?}", bucket, other);
                        return Err(AppError::StorageError(other.to_string()));
                    }
                },
                Err(e) => return Err(AppError::StorageError(e.to_string())),
            }
        }

        let policy = serde_json::json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Principal": {"AWS": ["*"]},
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{}/*", bucket)],
            }],
        });

        if let Err(e) = self
            .client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy.to_string())
            .send()
            .await
        {
            warn!("Failed to set public read policy on '{}': {:?}", bucket, e);
        }

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for S3StorageBackend {
    async fn put(&self, data: Bytes, suggested_name: &str, content_type: &str) -> AppResult<String> {
        let key = self.object_key(&blob_extension(suggested_name, content_type));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                warn!("S3 upload error bucket={} key={}: {:?}", self.bucket, key, e);
                AppError::StorageError(e.to_string())
            })?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(self.object_url(&key))
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let key = self
            .key_from_url(url)
            .ok_or_else(|| AppError::StorageError(format!("URL is not an object of bucket '{}': {}", self.bucket, url)))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                warn!("S3 delete error bucket={} key={}: {:?}", self.bucket, key, e);
                AppError::StorageError(e.to_string())
            })?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::S3StorageBackend;
    use crate::infra::config::S3Config;

    #[fixture]
    fn s3_config() -> S3Config {
        S3Config {
            access_key: "admin".to_string(),
            secret_key: "password".to_string(),
            endpoint: "http://minio:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "public-bucket".to_string(),
            public_url: Some("http://127.0.0.1:9000/".to_string()),
            prefix: "/avatars/".to_string(),
        }
    }

    #[rstest]
    fn test_object_key_layout(s3_config: S3Config) {
        let backend = S3StorageBackend::new(&s3_config);
        let key = backend.object_key("png");

        assert!(key.starts_with("avatars/"));
        assert!(key.ends_with(".png"));
        assert_ne!(key, backend.object_key("png"));
    }

    #[rstest]
    fn test_object_url_round_trips_to_key(s3_config: S3Config) {
        let backend = S3StorageBackend::new(&s3_config);
        let url = backend.object_url("avatars/abc.png");

        assert_eq!(url, "http://127.0.0.1:9000/public-bucket/avatars/abc.png");
        assert_eq!(backend.key_from_url(&url), Some("avatars/abc.png"));
    }

    #[rstest]
    #[case("http://elsewhere:9000/public-bucket/avatars/abc.png")]
    #[case("http://127.0.0.1:9000/other-bucket/avatars/abc.png")]
    #[case("http://127.0.0.1:9000/public-bucket/")]
    #[case("/uploads/abc.png")]
    fn test_foreign_urls_have_no_key(s3_config: S3Config, #[case] url: &str) {
        let backend = S3StorageBackend::new(&s3_config);
        assert_eq!(backend.key_from_url(url), None);
    }

    #[rstest]
    fn test_public_url_defaults_to_endpoint(mut s3_config: S3Config) {
        s3_config.public_url = None;
        s3_config.prefix = String::new();
        let backend = S3StorageBackend::new(&s3_config);

        assert_eq!(backend.object_url("a.png"), "http://minio:9000/public-bucket/a.png");
        assert!(!backend.object_key("png").contains('/'));
    }
}
