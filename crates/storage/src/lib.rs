//! Storage backends for tabloid services: S3-compatible object storage and
//! the PostgreSQL tabloid repository.

pub mod image_store;
pub mod object_store;
pub mod repository;

pub use image_store::ImageStore;
pub use object_store::{ObjectStorage, ObjectStorageConfig};
pub use repository::{TabloidRepository, TabloidTx};
