//! Port implementations over the storage crate.

use async_trait::async_trait;
use bytes::Bytes;

use storage::{ImageStore, TabloidRepository, TabloidTx};
use tabloid_common::{Region, TabloidDraft, TabloidResult};

use crate::ports::{IngestionTx, ObjectUploader, RegionLookup, RelationalWriter};

#[async_trait]
impl RegionLookup for TabloidRepository {
    async fn find(&self, region_id: i64) -> TabloidResult<Option<Region>> {
        self.find_region(region_id).await
    }
}

#[async_trait]
impl RelationalWriter for TabloidRepository {
    async fn begin(&self) -> TabloidResult<Box<dyn IngestionTx>> {
        let tx = TabloidRepository::begin(self).await?;
        Ok(Box::new(tx))
    }
}

#[async_trait]
impl IngestionTx for TabloidTx {
    async fn insert_tabloid(&mut self, draft: &TabloidDraft) -> TabloidResult<i64> {
        TabloidTx::insert_tabloid(self, draft).await
    }

    async fn insert_image_ref(
        &mut self,
        object_key: &str,
        tabloid_id: i64,
        position: i32,
    ) -> TabloidResult<()> {
        TabloidTx::insert_image_ref(self, object_key, tabloid_id, position).await
    }

    async fn commit(self: Box<Self>) -> TabloidResult<()> {
        TabloidTx::commit(*self).await
    }

    async fn rollback(self: Box<Self>) -> TabloidResult<()> {
        TabloidTx::rollback(*self).await
    }
}

#[async_trait]
impl ObjectUploader for ImageStore {
    async fn put(&self, payload: &Bytes, owner_id: i64, position: i32) -> TabloidResult<String> {
        self.put_image(payload, owner_id, position).await
    }

    async fn delete(&self, key: &str) -> TabloidResult<()> {
        self.delete_image(key).await
    }
}
