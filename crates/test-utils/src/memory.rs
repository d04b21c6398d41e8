//! In-memory fakes for the ingestion storage seams.
//!
//! These implement the coordinator's port traits over plain collections so
//! tests can observe exactly what was committed, uploaded, and deleted, and
//! can inject failures at each step of the write path.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use ingestion::{IngestionTx, ObjectUploader, RegionLookup, RelationalWriter};
use tabloid_common::{
    ImageFormat, ImageReference, Region, TabloidDraft, TabloidError, TabloidRecord, TabloidResult,
};

/// Region lookup over a fixed set of regions.
#[derive(Default)]
pub struct MemoryRegions {
    regions: HashMap<i64, Region>,
    fail: AtomicBool,
}

impl MemoryRegions {
    /// Add a known region.
    pub fn with_region(mut self, id: i64, name: &str) -> Self {
        let now = Utc::now();
        self.regions.insert(
            id,
            Region {
                id,
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        self
    }

    /// Make every lookup fail with `StorageUnavailable`.
    pub fn fail_lookups(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RegionLookup for MemoryRegions {
    async fn find(&self, region_id: i64) -> TabloidResult<Option<Region>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TabloidError::StorageUnavailable(
                "region lookup unavailable".to_string(),
            ));
        }
        Ok(self.regions.get(&region_id).cloned())
    }
}

/// Object uploader over a HashMap, mirroring the real store's semantics:
/// empty payload no-op, sniffed allow-list, unique derived keys.
#[derive(Default)]
pub struct MemoryUploader {
    objects: Mutex<HashMap<String, Bytes>>,
    deleted: Mutex<Vec<String>>,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
}

impl MemoryUploader {
    /// Make the next and all further puts fail with `UploadFailed`.
    pub fn fail_puts(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    /// Make deletes fail, to exercise the orphaned-object path.
    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Keys currently holding an object.
    pub fn stored_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Payload stored under a key, if any.
    pub fn stored_object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Keys that have been deleted, in order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectUploader for MemoryUploader {
    async fn put(&self, payload: &Bytes, owner_id: i64, position: i32) -> TabloidResult<String> {
        if payload.is_empty() {
            return Ok(String::new());
        }

        let format = ImageFormat::detect(payload).ok_or_else(|| {
            TabloidError::UnsupportedMediaType("payload is not a PNG or JPEG image".to_string())
        })?;

        if self.fail_put.load(Ordering::SeqCst) {
            return Err(TabloidError::UploadFailed("injected put failure".to_string()));
        }

        let key = format!(
            "test/{}/campanha-{}-{}-pagina-{}{}",
            owner_id,
            owner_id,
            Uuid::new_v4(),
            position + 1,
            format.extension()
        );
        self.objects.lock().unwrap().insert(key.clone(), payload.clone());
        Ok(key)
    }

    async fn delete(&self, key: &str) -> TabloidResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(TabloidError::UploadFailed(
                "injected delete failure".to_string(),
            ));
        }
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// Committed relational state shared between a writer and its transactions.
#[derive(Default)]
pub struct MemoryDb {
    next_id: AtomicI64,
    tabloids: Mutex<Vec<TabloidRecord>>,
    image_refs: Mutex<Vec<ImageReference>>,
}

impl MemoryDb {
    /// Committed tabloid rows.
    pub fn tabloids(&self) -> Vec<TabloidRecord> {
        self.tabloids.lock().unwrap().clone()
    }

    /// Committed image reference rows.
    pub fn image_refs(&self) -> Vec<ImageReference> {
        self.image_refs.lock().unwrap().clone()
    }

    /// Committed image references owned by one tabloid.
    pub fn image_refs_for(&self, tabloid_id: i64) -> Vec<ImageReference> {
        self.image_refs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.tabloid_id == tabloid_id)
            .cloned()
            .collect()
    }
}

/// Relational writer over [`MemoryDb`], with per-step failure injection.
#[derive(Default)]
pub struct MemoryWriter {
    db: Arc<MemoryDb>,
    fail_begin: AtomicBool,
    fail_insert_tabloid: AtomicBool,
    fail_insert_image_ref: AtomicBool,
    fail_commit: AtomicBool,
}

impl MemoryWriter {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        Self {
            db,
            ..Default::default()
        }
    }

    pub fn fail_begin(&self) {
        self.fail_begin.store(true, Ordering::SeqCst);
    }

    pub fn fail_insert_tabloid(&self) {
        self.fail_insert_tabloid.store(true, Ordering::SeqCst);
    }

    pub fn fail_insert_image_ref(&self) {
        self.fail_insert_image_ref.store(true, Ordering::SeqCst);
    }

    pub fn fail_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RelationalWriter for MemoryWriter {
    async fn begin(&self) -> TabloidResult<Box<dyn IngestionTx>> {
        if self.fail_begin.load(Ordering::SeqCst) {
            return Err(TabloidError::StorageUnavailable(
                "injected begin failure".to_string(),
            ));
        }

        Ok(Box::new(MemoryTx {
            db: Arc::clone(&self.db),
            staged_tabloids: Vec::new(),
            staged_refs: Vec::new(),
            fail_insert_tabloid: self.fail_insert_tabloid.load(Ordering::SeqCst),
            fail_insert_image_ref: self.fail_insert_image_ref.load(Ordering::SeqCst),
            fail_commit: self.fail_commit.load(Ordering::SeqCst),
        }))
    }
}

/// One staged transaction; writes only land in the db on commit.
struct MemoryTx {
    db: Arc<MemoryDb>,
    staged_tabloids: Vec<TabloidRecord>,
    staged_refs: Vec<ImageReference>,
    fail_insert_tabloid: bool,
    fail_insert_image_ref: bool,
    fail_commit: bool,
}

#[async_trait]
impl IngestionTx for MemoryTx {
    async fn insert_tabloid(&mut self, draft: &TabloidDraft) -> TabloidResult<i64> {
        if self.fail_insert_tabloid {
            return Err(TabloidError::StorageUnavailable(
                "injected insert_tabloid failure".to_string(),
            ));
        }

        let id = self.db.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.staged_tabloids.push(TabloidRecord {
            id,
            name: draft.name.clone(),
            region_id: draft.region_id,
            start_validity: draft.start_validity,
            end_validity: draft.end_validity,
            active: true,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_image_ref(
        &mut self,
        object_key: &str,
        tabloid_id: i64,
        position: i32,
    ) -> TabloidResult<()> {
        if self.fail_insert_image_ref {
            return Err(TabloidError::StorageUnavailable(
                "injected insert_image_ref failure".to_string(),
            ));
        }

        if !self.staged_tabloids.iter().any(|t| t.id == tabloid_id) {
            return Err(TabloidError::ConstraintViolation(format!(
                "tabloid {} not visible in transaction",
                tabloid_id
            )));
        }

        self.staged_refs.push(ImageReference {
            object_key: object_key.to_string(),
            tabloid_id,
            position,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> TabloidResult<()> {
        if self.fail_commit {
            return Err(TabloidError::StorageUnavailable(
                "injected commit failure".to_string(),
            ));
        }

        self.db
            .tabloids
            .lock()
            .unwrap()
            .extend(self.staged_tabloids);
        self.db.image_refs.lock().unwrap().extend(self.staged_refs);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TabloidResult<()> {
        // Staged writes are dropped with the handle.
        Ok(())
    }
}
