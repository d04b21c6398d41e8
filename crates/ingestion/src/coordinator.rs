//! The write-path coordinator for tabloid submissions.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use tabloid_common::{TabloidDraft, TabloidError, TabloidResult};

use crate::ports::{IngestionTx, ObjectUploader, RegionLookup, RelationalWriter};

/// Page position of the single uploaded image.
const PAGE_POSITION: i32 = 0;

/// Coordinates one tabloid submission across the relational store and the
/// object store.
///
/// Step order is fixed: the tabloid row is inserted before the upload so
/// the generated id can be embedded in the object key, and the image
/// reference is inserted after the upload so it can never point at a
/// missing object. Both inserts share one transaction, so a reader never
/// sees a tabloid row without its image reference once the commit lands.
pub struct IngestionCoordinator {
    regions: Arc<dyn RegionLookup>,
    uploader: Arc<dyn ObjectUploader>,
    writer: Arc<dyn RelationalWriter>,
    /// Optional CDN base prepended to the object key in the persisted
    /// reference and the receipt.
    cdn_url: Option<String>,
}

/// What the caller gets back from a committed ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReceipt {
    pub tabloid_id: i64,
    pub name: String,
    pub region_id: i64,
    pub start_validity: NaiveDate,
    pub end_validity: NaiveDate,
    /// Stored image reference: the object key, CDN-prefixed when configured.
    pub image_url: String,
}

impl IngestionCoordinator {
    /// Create a coordinator over the three storage seams.
    pub fn new(
        regions: Arc<dyn RegionLookup>,
        uploader: Arc<dyn ObjectUploader>,
        writer: Arc<dyn RelationalWriter>,
    ) -> Self {
        Self {
            regions,
            uploader,
            writer,
            cdn_url: None,
        }
    }

    /// Prefix persisted image references with a CDN base URL.
    pub fn with_cdn_url(mut self, cdn_url: impl Into<String>) -> Self {
        self.cdn_url = Some(cdn_url.into());
        self
    }

    /// Ingest one draft.
    ///
    /// Any failure aborts the whole attempt: the transaction is rolled
    /// back, and an object uploaded before the failure is deleted
    /// best-effort. The caller either gets a fully consistent success or a
    /// categorized error with no new rows visible; retrying from scratch is
    /// safe because a retry generates a fresh id and a fresh key.
    #[instrument(skip(self, draft), fields(name = %draft.name, region_id = draft.region_id))]
    pub async fn ingest(&self, draft: &TabloidDraft) -> TabloidResult<IngestionReceipt> {
        // Shape validation happens before any I/O.
        draft.validate()?;

        let region = self.regions.find(draft.region_id).await?;
        if region.is_none() {
            return Err(TabloidError::RegionNotFound(draft.region_id));
        }

        let mut tx = self.writer.begin().await?;

        let tabloid_id = match tx.insert_tabloid(draft).await {
            Ok(id) => id,
            Err(e) => return self.abort(tx, None, e).await,
        };

        let object_key = match self.uploader.put(&draft.image, tabloid_id, PAGE_POSITION).await {
            Ok(key) => key,
            Err(e) => return self.abort(tx, None, e).await,
        };

        let image_url = self.stored_reference(&object_key);

        if let Err(e) = tx
            .insert_image_ref(&image_url, tabloid_id, PAGE_POSITION)
            .await
        {
            return self.abort(tx, Some(&object_key), e).await;
        }

        if let Err(e) = tx.commit().await {
            self.compensate_upload(&object_key).await;
            return Err(e);
        }

        info!(
            tabloid_id = tabloid_id,
            image_url = %image_url,
            "Ingestion committed"
        );

        Ok(IngestionReceipt {
            tabloid_id,
            name: draft.name.clone(),
            region_id: draft.region_id,
            start_validity: draft.start_validity,
            end_validity: draft.end_validity,
            image_url,
        })
    }

    /// Roll back the transaction and undo a completed upload, then surface
    /// the original error. Cleanup failures are logged, never returned.
    async fn abort<T>(
        &self,
        tx: Box<dyn IngestionTx>,
        uploaded_key: Option<&str>,
        cause: TabloidError,
    ) -> TabloidResult<T> {
        if let Err(e) = tx.rollback().await {
            error!(error = %e, "Rollback failed after aborted ingestion");
        }

        if let Some(key) = uploaded_key {
            self.compensate_upload(key).await;
        }

        Err(cause)
    }

    /// Best-effort delete of an uploaded object that will never be
    /// referenced. A failure here leaves an orphaned object behind.
    async fn compensate_upload(&self, object_key: &str) {
        if object_key.is_empty() {
            return;
        }

        match self.uploader.delete(object_key).await {
            Ok(()) => info!(key = %object_key, "Deleted orphaned upload"),
            Err(e) => warn!(key = %object_key, error = %e, "Could not delete orphaned upload"),
        }
    }

    fn stored_reference(&self, object_key: &str) -> String {
        match &self.cdn_url {
            Some(cdn) => format!("{}{}", cdn, object_key),
            None => object_key.to_string(),
        }
    }
}
