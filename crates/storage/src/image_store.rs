//! Image upload on top of object storage: payload sniffing, key derivation,
//! durable put.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use tabloid_common::{ImageFormat, TabloidError, TabloidResult};

use crate::object_store::ObjectStorage;

/// Default key namespace, matching the legacy bucket layout.
pub const DEFAULT_NAMESPACE: &str = "RPA/v3";

/// Uploader for tabloid page images.
pub struct ImageStore {
    storage: Arc<ObjectStorage>,
    namespace: String,
}

impl ImageStore {
    /// Create a new image store writing under the given key namespace.
    pub fn new(storage: Arc<ObjectStorage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    /// Store one page image and return the object key it was written under.
    ///
    /// An empty payload is a deliberate no-op for "no image": returns an
    /// empty key without touching storage. Non-PNG/JPEG payloads are
    /// rejected before any write; the format is sniffed from the bytes.
    /// On Ok, the object is durably stored before this returns.
    #[instrument(skip(self, payload), fields(tabloid_id = tabloid_id, position = position))]
    pub async fn put_image(
        &self,
        payload: &Bytes,
        tabloid_id: i64,
        position: i32,
    ) -> TabloidResult<String> {
        if payload.is_empty() {
            return Ok(String::new());
        }

        let format = ImageFormat::detect(payload).ok_or_else(|| {
            TabloidError::UnsupportedMediaType(
                "payload is not a PNG or JPEG image".to_string(),
            )
        })?;

        let key = image_key(&self.namespace, tabloid_id, position, Uuid::new_v4(), format);
        self.storage.put(&key, payload.clone()).await?;

        debug!(key = %key, size = payload.len(), "Stored page image");
        Ok(key)
    }

    /// Best-effort removal of a previously stored image.
    pub async fn delete_image(&self, key: &str) -> TabloidResult<()> {
        self.storage.delete(key).await
    }
}

/// Derive the object key for one page image.
///
/// Format: `{namespace}/{tabloid_id}/campanha-{tabloid_id}-{uuid}-pagina-{page}{ext}`
/// where `page` is 1-based. The tabloid id appears in both the folder and
/// the filename for traceability; the uuid makes every upload unique.
pub fn image_key(
    namespace: &str,
    tabloid_id: i64,
    position: i32,
    unique: Uuid,
    format: ImageFormat,
) -> String {
    format!(
        "{}/{}/campanha-{}-{}-pagina-{}{}",
        namespace,
        tabloid_id,
        tabloid_id,
        unique,
        position + 1,
        format.extension()
    )
}
