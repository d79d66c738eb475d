//! S3-compatible object storage provider (requires the `s3` feature).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, error, info};

use docvault_core::config::S3StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::{BackendKind, DeleteOutcome, StorageProvider};

/// S3-compatible storage provider.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
    /// Prepended to every key, without a trailing slash.
    prefix: String,
}

impl S3StorageProvider {
    /// Create a new S3 storage provider.
    ///
    /// Static credentials are used when configured; otherwise the default
    /// AWS credential chain applies. A custom endpoint switches to
    /// path-style addressing for MinIO and similar services.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("S3 storage requires a bucket name"));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "docvault-config",
            ));
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(!config.endpoint.is_empty())
            .build();

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initialized S3 storage provider"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            prefix: config.prefix.trim_matches('/').to_string(),
        })
    }

    fn object_key(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Object
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn read(&self, key: &str) -> AppResult<Bytes> {
        let object_key = self.object_key(key);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return AppError::not_found(format!("Object not found: {key}"));
                }
                error!(bucket = %self.bucket, key = %object_key, error = ?e, "S3 GET failed");
                AppError::storage(format!("Failed to read object {key}: {e}"))
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::storage(format!("Failed to read body of {key}: {e}")))?;
        Ok(body.into_bytes())
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        let object_key = self.object_key(key);
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!(bucket = %self.bucket, key = %object_key, error = ?e, "S3 PUT failed");
                AppError::storage(format!("Failed to write object {key}: {e}"))
            })?;

        debug!(key = %object_key, bytes = size, "Wrote S3 object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<DeleteOutcome> {
        // DeleteObject succeeds for missing keys, so probe first.
        if !self.exists(key).await? {
            return Ok(DeleteOutcome::NotFound);
        }

        let object_key = self.object_key(key);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| AppError::storage(format!("Failed to delete object {key}: {e}")))?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let object_key = self.object_key(key);
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "Failed to check object {key}: {service_error}"
                    )))
                }
            }
        }
    }
}
