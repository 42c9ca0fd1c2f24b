//! # Working Set
//!
//! A `CacheMultiStore` buffers every write of the current block on top of the
//! last committed state. Nothing reaches the backend until the commit.
//!
//! ## Checkpoints
//!
//! Each write records an undo entry in a journal. A transaction takes a
//! [`Checkpoint`] before running; on failure the journal is unwound back to it,
//! leaving the working set exactly as it was before the transaction.

use super::{namespace_prefix, store_key::StoreKey};
use crate::errors::StoreError;
use crate::ports::{BatchOperation, KeyValueStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Position in the working-set journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Undo record: the overlay entry for `key` before the write.
#[derive(Debug)]
struct JournalEntry {
    key: Vec<u8>,
    previous: Option<Option<Vec<u8>>>,
}

/// Uncommitted writes layered over committed state.
pub struct CacheMultiStore {
    parent: Arc<dyn KeyValueStore>,
    mounted: Arc<BTreeSet<&'static str>>,
    /// `None` marks a deletion.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    journal: Vec<JournalEntry>,
}

impl CacheMultiStore {
    pub(crate) fn new(parent: Arc<dyn KeyValueStore>, mounted: Arc<BTreeSet<&'static str>>) -> Self {
        Self {
            parent,
            mounted,
            writes: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    fn namespace(&self, key: &StoreKey) -> Result<Vec<u8>, StoreError> {
        if !self.mounted.contains(key.name()) {
            return Err(StoreError::NotMounted {
                name: key.name().to_string(),
            });
        }
        Ok(namespace_prefix(key.name()))
    }

    fn full_key(&self, key: &StoreKey, k: &[u8]) -> Result<Vec<u8>, StoreError> {
        let mut full = self.namespace(key)?;
        full.extend_from_slice(k);
        Ok(full)
    }

    /// Read a value from the namespace of `key`.
    pub fn get(&self, key: &StoreKey, k: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let full = self.full_key(key, k)?;
        match self.writes.get(&full) {
            Some(entry) => Ok(entry.clone()),
            None => self.parent.get(&full),
        }
    }

    pub fn has(&self, key: &StoreKey, k: &[u8]) -> Result<bool, StoreError> {
        let full = self.full_key(key, k)?;
        match self.writes.get(&full) {
            Some(entry) => Ok(entry.is_some()),
            None => self.parent.exists(&full),
        }
    }

    pub fn set(&mut self, key: &StoreKey, k: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        let full = self.full_key(key, k)?;
        self.write(full, Some(value));
        Ok(())
    }

    pub fn delete(&mut self, key: &StoreKey, k: &[u8]) -> Result<(), StoreError> {
        let full = self.full_key(key, k)?;
        self.write(full, None);
        Ok(())
    }

    fn write(&mut self, full: Vec<u8>, value: Option<Vec<u8>>) {
        let previous = self.writes.insert(full.clone(), value);
        self.journal.push(JournalEntry {
            key: full,
            previous,
        });
    }

    /// Entries of the namespace whose key starts with `prefix`, ascending.
    ///
    /// Returned keys are relative to the namespace.
    pub fn iter_prefix(
        &self,
        key: &StoreKey,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let ns = self.namespace(key)?;
        let mut full_prefix = ns.clone();
        full_prefix.extend_from_slice(prefix);

        Ok(self
            .merged_scan(&full_prefix)?
            .into_iter()
            .map(|(k, v)| (k[ns.len()..].to_vec(), v))
            .collect())
    }

    /// Full-key scan merging the overlay into committed state.
    pub(crate) fn merged_scan(&self, full_prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.prefix_scan(full_prefix)?.into_iter().collect();

        let overlay = self
            .writes
            .range(full_prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(full_prefix));
        for (k, v) in overlay {
            match v {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }

    pub(crate) fn mounted(&self) -> &BTreeSet<&'static str> {
        &self.mounted
    }

    /// Mark the current journal position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Undo every write made after `checkpoint`.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        if checkpoint.0 > self.journal.len() {
            return Err(StoreError::InvalidCheckpoint {
                checkpoint: checkpoint.0,
                journal_len: self.journal.len(),
            });
        }

        while self.journal.len() > checkpoint.0 {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry.previous {
                Some(previous) => {
                    self.writes.insert(entry.key, previous);
                }
                None => {
                    self.writes.remove(&entry.key);
                }
            }
        }
        Ok(())
    }

    /// Drop all undo information. Writes stay in the working set.
    pub fn discard_journal(&mut self) {
        self.journal.clear();
    }

    /// Number of keys written (or deleted) in this working set.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub(crate) fn into_batch(self) -> Vec<BatchOperation> {
        self.writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::Put { key, value },
                None => BatchOperation::Delete { key },
            })
            .collect()
    }
}

impl std::fmt::Debug for CacheMultiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheMultiStore")
            .field("mounted", &self.mounted)
            .field("pending_writes", &self.writes.len())
            .field("journal_len", &self.journal.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKVStore;

    fn cache_with(names: &[&'static str]) -> CacheMultiStore {
        let mounted: BTreeSet<&'static str> = names.iter().copied().collect();
        CacheMultiStore::new(Arc::new(InMemoryKVStore::new()), Arc::new(mounted))
    }

    #[test]
    fn test_unmounted_key_is_rejected() {
        let mut cache = cache_with(&["acc"]);
        let other = StoreKey::new("bank");

        let err = cache.set(&other, b"x", b"1".to_vec()).unwrap_err();
        assert!(matches!(err, StoreError::NotMounted { .. }));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let mut cache = cache_with(&["acc", "bank"]);
        let acc = StoreKey::new("acc");
        let bank = StoreKey::new("bank");

        cache.set(&acc, b"k", b"from-acc".to_vec()).unwrap();
        assert_eq!(cache.get(&bank, b"k").unwrap(), None);
        assert_eq!(cache.get(&acc, b"k").unwrap(), Some(b"from-acc".to_vec()));
    }

    #[test]
    fn test_revert_restores_previous_values() {
        let mut cache = cache_with(&["acc"]);
        let acc = StoreKey::new("acc");
        cache.set(&acc, b"a", b"1".to_vec()).unwrap();

        let checkpoint = cache.checkpoint();
        cache.set(&acc, b"a", b"2".to_vec()).unwrap();
        cache.set(&acc, b"b", b"3".to_vec()).unwrap();
        cache.delete(&acc, b"a").unwrap();
        cache.revert_to(checkpoint).unwrap();

        assert_eq!(cache.get(&acc, b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(cache.get(&acc, b"b").unwrap(), None);
        assert_eq!(cache.pending_writes(), 1);
    }

    #[test]
    fn test_iter_prefix_merges_overlay_and_deletions() {
        let parent = Arc::new(InMemoryKVStore::new());
        parent
            .atomic_batch_write(vec![
                BatchOperation::put(b"k:acc/a/1".to_vec(), b"p1".to_vec()),
                BatchOperation::put(b"k:acc/a/2".to_vec(), b"p2".to_vec()),
            ])
            .unwrap();
        let mounted: BTreeSet<&'static str> = ["acc"].into_iter().collect();
        let mut cache = CacheMultiStore::new(parent, Arc::new(mounted));
        let acc = StoreKey::new("acc");

        cache.delete(&acc, b"a/1").unwrap();
        cache.set(&acc, b"a/3", b"c3".to_vec()).unwrap();
        cache.set(&acc, b"b/1", b"other".to_vec()).unwrap();

        let entries = cache.iter_prefix(&acc, b"a/").unwrap();
        assert_eq!(
            entries,
            vec![
                (b"a/2".to_vec(), b"p2".to_vec()),
                (b"a/3".to_vec(), b"c3".to_vec()),
            ]
        );
    }

    #[test]
    fn test_invalid_checkpoint() {
        let mut cache = cache_with(&["acc"]);
        let acc = StoreKey::new("acc");
        cache.set(&acc, b"a", b"1".to_vec()).unwrap();
        let checkpoint = cache.checkpoint();
        cache.discard_journal();

        assert!(cache.revert_to(checkpoint).is_err());
    }
}
