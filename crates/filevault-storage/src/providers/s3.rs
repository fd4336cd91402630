//! S3-compatible object storage blob store (requires the `s3` feature).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream as S3Body;
use bytes::BytesMut;
use futures::stream::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use filevault_core::config::S3StorageConfig;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{BlobStore, ByteStream};

/// Blob store backed by a single S3 (or MinIO) bucket.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client from configuration and make sure the bucket exists
    /// when `create_bucket` is set.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        let endpoint = if config.endpoint.is_empty() {
            "aws"
        } else {
            config.endpoint.as_str()
        };
        info!(
            endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 blob store"
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "filevault",
            ));
        }
        let sdk_config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);
        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(&config.endpoint);
        }

        let store = Self {
            client: S3Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        };

        if config.create_bucket {
            store.ensure_bucket().await?;
        }
        Ok(store)
    }

    async fn ensure_bucket(&self) -> AppResult<()> {
        if self.bucket_exists().await? {
            return Ok(());
        }
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create bucket {}", self.bucket),
                    e,
                )
            })?;
        info!(bucket = %self.bucket, "Created S3 bucket");
        Ok(())
    }

    async fn bucket_exists(&self) -> AppResult<bool> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to check bucket {}", self.bucket),
                e,
            )),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.bucket_exists().await
    }

    async fn put(
        &self,
        key: &str,
        mut stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> AppResult<u64> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Stream read error", e))?;
            buffer.extend_from_slice(&chunk);
        }

        let written = buffer.len() as u64;
        if written != size {
            return Err(AppError::storage(format!(
                "Blob {key} declared {size} bytes but received {written}"
            )));
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(written as i64)
            .content_type(content_type)
            .body(S3Body::from(buffer.freeze()))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to upload blob: {key}"),
                    e,
                )
            })?;

        debug!(bucket = %self.bucket, key, bytes = written, "Uploaded blob");
        Ok(written)
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Blob not found: {key}"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to fetch blob: {key}"),
                        e,
                    )
                }
            })?;

        Ok(Box::pin(ReaderStream::new(resp.body.into_async_read())))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete blob: {key}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat blob: {key}"),
                e,
            )),
        }
    }
}
