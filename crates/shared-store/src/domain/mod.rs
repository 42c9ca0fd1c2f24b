//! Store domain: namespaces, multi-stores and gas metering.

pub mod cache;
pub mod commit;
pub mod gas;
pub mod store_key;

/// Prefix for namespaced data keys in the backend.
pub(crate) const DATA_PREFIX: &[u8] = b"k:";

/// Prefix for multi-store metadata in the backend.
pub(crate) const META_PREFIX: &[u8] = b"m:";

/// Backend prefix of a namespace: `k:<name>/`.
pub(crate) fn namespace_prefix(name: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(DATA_PREFIX.len() + name.len() + 1);
    prefix.extend_from_slice(DATA_PREFIX);
    prefix.extend_from_slice(name.as_bytes());
    prefix.push(b'/');
    prefix
}
