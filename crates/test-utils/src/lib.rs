//! Shared test utilities for the tabloid-services workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Image byte fixtures (valid PNG/JPEG magic, non-image bytes)
//! - In-memory fakes for the ingestion storage seams, with failure
//!   injection for partial-write tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod memory;

pub use fixtures::*;
pub use memory::{MemoryDb, MemoryRegions, MemoryUploader, MemoryWriter};
