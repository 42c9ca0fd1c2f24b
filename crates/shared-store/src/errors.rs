//! Store error types.

use thiserror::Error;

/// Errors raised by the store layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend I/O failure. Always fatal for the caller.
    #[error("Storage I/O error: {message}")]
    Io { message: String },

    /// Access through a store key that was never mounted.
    #[error("Store '{name}' is not mounted")]
    NotMounted { name: String },

    /// The same store key name was mounted twice.
    #[error("Store '{name}' is already mounted")]
    DuplicateMount { name: String },

    /// Store key names are used as namespace prefixes.
    #[error("Invalid store name '{name}': {reason}")]
    InvalidStoreName { name: String, reason: &'static str },

    /// Gas limit exhausted while accessing state.
    #[error("Out of gas in location: {descriptor}; gasWanted: {limit}, gasUsed: {consumed}")]
    OutOfGas {
        descriptor: String,
        limit: u64,
        consumed: u64,
    },

    /// Persisted metadata could not be decoded.
    #[error("Corrupted store metadata: {message}")]
    CorruptedMetadata { message: String },

    /// Commit version must be strictly increasing.
    #[error("Commit version {requested} does not advance past {last}")]
    VersionNotAdvancing { last: u64, requested: u64 },

    /// Checkpoint does not belong to the current working set.
    #[error("Invalid checkpoint {checkpoint} (journal length {journal_len})")]
    InvalidCheckpoint {
        checkpoint: usize,
        journal_len: usize,
    },
}

impl StoreError {
    /// Create an I/O error from any displayable backend error.
    pub fn io(err: impl std::fmt::Display) -> Self {
        StoreError::Io {
            message: err.to_string(),
        }
    }

    /// Whether the error stems from gas exhaustion rather than storage failure.
    pub fn is_out_of_gas(&self) -> bool {
        matches!(self, StoreError::OutOfGas { .. })
    }
}
