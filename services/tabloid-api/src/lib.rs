//! Tabloid submission API: configuration and HTTP server.
//!
//! The binary in `main.rs` wires these onto real Postgres and object
//! storage; integration tests drive the same router over in-memory
//! fakes.

pub mod config;
pub mod server;
