//! # Shared Store
//!
//! Versioned, namespaced key-value state for the application.
//!
//! ## Layers
//!
//! ```text
//! Module keeper ──▶ Context (gas metered) ──▶ CacheMultiStore (working set)
//!                                                   │ commit
//!                                                   ▼
//!                                            CommitMultiStore ──▶ KeyValueStore
//!                                                                 (memory | rocksdb)
//! ```
//!
//! - Every module reads and writes only through the [`StoreKey`] it was handed
//!   by the composition root. Keys are not cloneable, so a namespace has a
//!   single owner.
//! - A block's writes accumulate in a [`CacheMultiStore`]. Transaction
//!   checkpoints inside the working set give all-or-nothing semantics per tx.
//! - [`CommitMultiStore::commit`] writes the working set in one atomic batch,
//!   advances the version and records the state digest.
//!
//! ## Crate Structure
//!
//! - `ports` - the `KeyValueStore` backend trait and `BatchOperation`
//! - `adapters/` - in-memory and RocksDB backends
//! - `domain/` - store keys, multi-stores, gas metering

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;

pub use adapters::memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb::{RocksDbConfig, RocksDbStore};
pub use domain::cache::{CacheMultiStore, Checkpoint};
pub use domain::commit::{CommitInfo, CommitMultiStore, StateDigest};
pub use domain::gas::{GasConfig, GasMeter};
pub use domain::store_key::StoreKey;
pub use errors::StoreError;
pub use ports::{BatchOperation, KeyValueStore};
