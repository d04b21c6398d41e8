//! Storage seams the coordinator is built against.
//!
//! The coordinator receives these as trait objects so tests can substitute
//! in-memory fakes; the production implementations live in the storage
//! crate (see `adapters`).

use async_trait::async_trait;
use bytes::Bytes;

use tabloid_common::{Region, TabloidDraft, TabloidResult};

/// Read-only region lookup against the relational store.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    /// Read one region by id. `Ok(None)` when no row matches.
    async fn find(&self, region_id: i64) -> TabloidResult<Option<Region>>;
}

/// Binary payload storage under derived keys.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Store a payload for the given owner and page position, returning the
    /// key it was written under. Empty payloads return an empty key without
    /// writing. The payload must be durable under the key when this
    /// returns Ok.
    async fn put(&self, payload: &Bytes, owner_id: i64, position: i32) -> TabloidResult<String>;

    /// Remove a stored payload. Used for compensation after late failures.
    async fn delete(&self, key: &str) -> TabloidResult<()>;
}

/// Relational writes scoped to explicit transactions.
#[async_trait]
pub trait RelationalWriter: Send + Sync {
    /// Open a new transaction. All writes of one ingestion go through the
    /// returned handle.
    async fn begin(&self) -> TabloidResult<Box<dyn IngestionTx>>;
}

/// One open relational transaction: the unit of atomicity for everything
/// written through it. Commit and rollback consume the handle.
#[async_trait]
pub trait IngestionTx: Send {
    /// Insert tabloid metadata, returning the generated id.
    async fn insert_tabloid(&mut self, draft: &TabloidDraft) -> TabloidResult<i64>;

    /// Insert the reference row for an already-stored object key.
    async fn insert_image_ref(
        &mut self,
        object_key: &str,
        tabloid_id: i64,
        position: i32,
    ) -> TabloidResult<()>;

    /// Make every write through this handle visible at once.
    async fn commit(self: Box<Self>) -> TabloidResult<()>;

    /// Discard every write through this handle.
    async fn rollback(self: Box<Self>) -> TabloidResult<()>;
}
