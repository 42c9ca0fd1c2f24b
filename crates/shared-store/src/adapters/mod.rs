//! # Storage Backends
//!
//! - `memory` - ordered in-memory map, used by tests and ephemeral nodes
//! - `rocksdb` - durable backend, enabled with the `rocksdb` feature

pub mod memory;

#[cfg(feature = "rocksdb")]
pub mod rocksdb;
