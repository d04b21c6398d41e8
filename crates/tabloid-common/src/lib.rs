//! Common types and utilities shared across all tabloid services.

pub mod error;
pub mod media;
pub mod region;
pub mod tabloid;

pub use error::{TabloidError, TabloidResult};
pub use media::ImageFormat;
pub use region::Region;
pub use tabloid::{ImageReference, TabloidDraft, TabloidRecord};
