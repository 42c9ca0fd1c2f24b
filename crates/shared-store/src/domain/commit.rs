//! # Committed Multi-Store
//!
//! Owns the backend, the set of mounted namespaces and the last commit
//! (version + state digest). A commit writes the block's working set together
//! with the new metadata in a single atomic batch, so a crash leaves either the
//! previous or the new version on disk, never a mix.
//!
//! ## State Digest
//!
//! `Keccak256` over every mounted namespace in name order, each namespace
//! hashed over its entries in key order (length-prefixed). Two stores with the
//! same logical contents always produce the same digest.

use super::cache::CacheMultiStore;
use super::store_key::StoreKey;
use super::{namespace_prefix, META_PREFIX};
use crate::errors::StoreError;
use crate::ports::{BatchOperation, KeyValueStore};
use sha3::{Digest, Keccak256};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

const META_HEIGHT: &[u8] = b"height";
const META_DIGEST: &[u8] = b"digest";

/// 32-byte digest of the full application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateDigest([u8; 32]);

impl StateDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| StoreError::CorruptedMetadata {
            message: format!("digest has {} bytes", bytes.len()),
        })?;
        Ok(Self(array))
    }
}

impl std::fmt::Display for StateDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Version and digest of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    pub height: u64,
    pub digest: StateDigest,
}

/// The durable, versioned application state.
pub struct CommitMultiStore {
    db: Arc<dyn KeyValueStore>,
    mounted: Arc<BTreeSet<&'static str>>,
    last_commit: Option<CommitInfo>,
}

impl CommitMultiStore {
    #[must_use]
    pub fn new(db: Arc<dyn KeyValueStore>) -> Self {
        Self {
            db,
            mounted: Arc::new(BTreeSet::new()),
            last_commit: None,
        }
    }

    /// Register a namespace. Must happen before any working set is created.
    pub fn mount(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        key.validate()?;
        if self.mounted.contains(key.name()) {
            return Err(StoreError::DuplicateMount {
                name: key.name().to_string(),
            });
        }
        Arc::make_mut(&mut self.mounted).insert(key.name());
        debug!("[store] Mounted namespace '{}'", key.name());
        Ok(())
    }

    pub fn mounted_names(&self) -> Vec<&'static str> {
        self.mounted.iter().copied().collect()
    }

    /// Load the latest committed version from the backend, if any.
    pub fn load_latest(&mut self) -> Result<Option<CommitInfo>, StoreError> {
        let height = self.db.get(&meta_key(META_HEIGHT))?;
        let digest = self.db.get(&meta_key(META_DIGEST))?;

        self.last_commit = match (height, digest) {
            (None, None) => None,
            (Some(height), Some(digest)) => {
                let height: [u8; 8] =
                    height
                        .as_slice()
                        .try_into()
                        .map_err(|_| StoreError::CorruptedMetadata {
                            message: format!("height has {} bytes", height.len()),
                        })?;
                Some(CommitInfo {
                    height: u64::from_be_bytes(height),
                    digest: StateDigest::from_slice(&digest)?,
                })
            }
            _ => {
                return Err(StoreError::CorruptedMetadata {
                    message: "height and digest must be stored together".to_string(),
                })
            }
        };

        if let Some(info) = &self.last_commit {
            info!(
                "[store] Loaded version {} (digest {})",
                info.height, info.digest
            );
        }
        Ok(self.last_commit)
    }

    pub fn last_commit(&self) -> Option<CommitInfo> {
        self.last_commit
    }

    /// Fresh working set over the last committed state.
    pub fn cache_wrap(&self) -> CacheMultiStore {
        CacheMultiStore::new(Arc::clone(&self.db), Arc::clone(&self.mounted))
    }

    /// Digest of the committed state seen through `cache`.
    pub fn digest_of(cache: &CacheMultiStore) -> Result<StateDigest, StoreError> {
        let mut root = Keccak256::new();
        for name in cache.mounted() {
            let mut namespace = Keccak256::new();
            let prefix = namespace_prefix(name);
            for (key, value) in cache.merged_scan(&prefix)? {
                let key = &key[prefix.len()..];
                namespace.update((key.len() as u64).to_be_bytes());
                namespace.update(key);
                namespace.update((value.len() as u64).to_be_bytes());
                namespace.update(&value);
            }
            root.update((name.len() as u64).to_be_bytes());
            root.update(name.as_bytes());
            root.update(namespace.finalize());
        }
        Ok(StateDigest(root.finalize().into()))
    }

    /// Persist `cache` as version `height`.
    pub fn commit(&mut self, cache: CacheMultiStore, height: u64) -> Result<CommitInfo, StoreError> {
        if let Some(last) = self.last_commit {
            if height <= last.height {
                return Err(StoreError::VersionNotAdvancing {
                    last: last.height,
                    requested: height,
                });
            }
        }

        let digest = Self::digest_of(&cache)?;
        let writes = cache.pending_writes();
        let mut batch = cache.into_batch();
        batch.push(BatchOperation::put(
            meta_key(META_HEIGHT),
            height.to_be_bytes().to_vec(),
        ));
        batch.push(BatchOperation::put(
            meta_key(META_DIGEST),
            digest.as_bytes().to_vec(),
        ));
        self.db.atomic_batch_write(batch)?;

        let info = CommitInfo { height, digest };
        self.last_commit = Some(info);
        debug!(
            "[store] Committed version {} ({} writes, digest {})",
            height, writes, digest
        );
        Ok(info)
    }
}

fn meta_key(name: &[u8]) -> Vec<u8> {
    let mut key = META_PREFIX.to_vec();
    key.extend_from_slice(name);
    key
}
