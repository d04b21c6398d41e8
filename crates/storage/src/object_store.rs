//! Object storage interface for tabloid images (MinIO/S3 compatible).

use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use tabloid_common::{TabloidError, TabloidResult};

/// Configuration for object storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://minio:9000".to_string(),
            bucket: "tabloid-media".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
        }
    }
}

/// Object storage client for tabloid image payloads.
#[derive(Debug)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    ///
    /// Fails with `StorageUnavailable`: a client that cannot be built is
    /// a store we cannot reach, not a failed write.
    pub fn new(config: &ObjectStorageConfig) -> TabloidResult<Self> {
        if config.bucket.is_empty() {
            return Err(TabloidError::StorageUnavailable(
                "Bucket name must be set".to_string(),
            ));
        }

        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            TabloidError::StorageUnavailable(format!("Failed to create S3 client: {}", e))
        })?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// Write bytes to a key in the bucket.
    ///
    /// The underlying put is atomic per key: the object is either fully
    /// visible under the key after this returns Ok, or not at all.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, key = %key))]
    pub async fn put(&self, key: &str, data: Bytes) -> TabloidResult<()> {
        let location = Path::from(key);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| TabloidError::UploadFailed(format!("Failed to write {}: {}", key, e)))?;

        Ok(())
    }

    /// Delete an object.
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn delete(&self, key: &str) -> TabloidResult<()> {
        let location = Path::from(key);

        self.store
            .delete(&location)
            .await
            .map_err(|e| TabloidError::UploadFailed(format!("Failed to delete {}: {}", key, e)))?;

        Ok(())
    }
}
