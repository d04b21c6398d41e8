//! Ingestion of tabloid submissions.
//!
//! The coordinator turns one [`tabloid_common::TabloidDraft`] into a
//! committed tabloid row, a durably stored image object, and an image
//! reference row, keeping the relational store and the object store
//! consistent even though no shared transaction spans them.

mod adapters;
mod coordinator;
mod ports;

pub use coordinator::{IngestionCoordinator, IngestionReceipt};
pub use ports::{IngestionTx, ObjectUploader, RegionLookup, RelationalWriter};
