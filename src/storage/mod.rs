//! Object storage for the uploaded log file and the computed artifacts
//! Uses Apache Arrow object_store crate

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::Method;
use object_store::aws::AmazonS3Builder;
use object_store::signer::Signer;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};

mod keys;

pub use keys::ArtifactKeys;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bucket '{actual}' is not served by this client (expected '{expected}')")]
    BucketMismatch { expected: String, actual: String },

    #[error("Signed URLs are not supported by the {0} backend")]
    SigningUnsupported(&'static str),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// A (bucket, key) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Metadata returned after upload
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub location: StorageLocation,
    pub etag: Option<String>,
    pub size: usize,
}

/// A time-limited GET link for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// The two storage operations the workflow needs
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Bucket shared by inputs and outputs
    fn bucket(&self) -> &str;

    /// Write `payload` under `location`, overwriting any previous object
    async fn store(&self, location: &StorageLocation, payload: Bytes) -> Result<StoredObject>;

    /// Issue a fresh GET link for an existing object, valid for `ttl`
    async fn signed_url(&self, location: &StorageLocation, ttl: Duration) -> Result<SignedUrl>;
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    bucket: String,
    backend: &'static str,
}

impl StorageClient {
    /// Create new storage client with any object_store backend; links can
    /// only be issued when a signer is attached with [`StorageClient::with_signer`].
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self {
            store,
            signer: None,
            bucket,
            backend: "custom",
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            signer: None,
            bucket: bucket.into(),
            backend: "memory",
        }
    }

    /// S3 (or S3-compatible) bucket; the same handle stores and signs
    pub fn s3(config: &StorageConfig) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            builder = builder
                .with_access_key_id(access_key)
                .with_secret_access_key(secret_key);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let s3 = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        Ok(Self {
            store: s3.clone(),
            signer: Some(s3),
            bucket: config.bucket.clone(),
            backend: "s3",
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.provider {
            StorageProvider::S3 => Self::s3(config),
            StorageProvider::Memory => Ok(Self::in_memory(config.bucket.clone())),
        }
    }

    /// Download from storage
    pub async fn download(&self, key: &str) -> Result<Bytes> {
        let path = StoragePath::from(key);

        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => other.into(),
        })?;

        Ok(result.bytes().await?)
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = StoragePath::from(key);

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn check_bucket(&self, location: &StorageLocation) -> Result<()> {
        if location.bucket != self.bucket {
            return Err(StorageError::BucketMismatch {
                expected: self.bucket.clone(),
                actual: location.bucket.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for StorageClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn store(&self, location: &StorageLocation, payload: Bytes) -> Result<StoredObject> {
        self.check_bucket(location)?;

        let path = StoragePath::from(location.key.as_str());
        let size = payload.len();

        let put_result = self
            .store
            .put(&path, payload.into())
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(bucket = %location.bucket, key = %location.key, size, "Uploaded to storage");

        Ok(StoredObject {
            location: location.clone(),
            etag: put_result.e_tag,
            size,
        })
    }

    async fn signed_url(&self, location: &StorageLocation, ttl: Duration) -> Result<SignedUrl> {
        self.check_bucket(location)?;

        let signer = self
            .signer
            .as_ref()
            .ok_or(StorageError::SigningUnsupported(self.backend))?;

        // Presigning never touches the bucket, so confirm the object first
        if !self.exists(&location.key).await? {
            return Err(StorageError::NotFound(location.to_string()));
        }

        let path = StoragePath::from(location.key.as_str());
        let issued_at = Utc::now();
        let url = signer.signed_url(Method::GET, &path, ttl).await?;

        let expires_at = issued_at
            + chrono::Duration::from_std(ttl)
                .map_err(|e| StorageError::ConfigError(format!("invalid link ttl: {}", e)))?;

        tracing::debug!(key = %location.key, ttl_secs = ttl.as_secs(), "Issued signed URL");

        Ok(SignedUrl {
            url: url.to_string(),
            expires_at,
        })
    }
}
