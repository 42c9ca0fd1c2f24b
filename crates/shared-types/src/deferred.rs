//! # Deferred Dependencies
//!
//! Keepers that depend on each other cyclically cannot both receive their
//! peer at construction. One side takes a [`Deferred`] slot instead; the
//! composition root fills the slot exactly once after both keepers exist.
//!
//! ```text
//! let validators: Deferred<dyn ValidatorSet> = Deferred::new("validator set");
//! let distr = DistrKeeper::new(.., validators.clone());     // holds the slot
//! let staking = StakingKeeper::new(..);
//! validators.resolve(Arc::new(StakingValidatorSet::new(staking)))?;
//! ```
//!
//! Using the slot before resolution is an error, and so is resolving it twice.

use crate::errors::DeferredError;
use std::sync::{Arc, OnceLock};

/// Write-once shared slot for a dependency that is bound after construction.
pub struct Deferred<T: ?Sized> {
    name: &'static str,
    cell: Arc<OnceLock<Arc<T>>>,
}

impl<T: ?Sized> Deferred<T> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: Arc::new(OnceLock::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bind the dependency. Fails if the slot is already bound.
    pub fn resolve(&self, value: Arc<T>) -> Result<(), DeferredError> {
        self.cell
            .set(value)
            .map_err(|_| DeferredError::AlreadyResolved(self.name))
    }

    pub fn get(&self) -> Result<&Arc<T>, DeferredError> {
        self.cell.get().ok_or(DeferredError::Unresolved(self.name))
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct Hello;

    impl Greeter for Hello {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn test_clones_share_the_slot() {
        let slot: Deferred<dyn Greeter> = Deferred::new("greeter");
        let held = slot.clone();
        assert!(matches!(
            held.get(),
            Err(DeferredError::Unresolved("greeter"))
        ));

        slot.resolve(Arc::new(Hello)).unwrap();
        assert_eq!(held.get().unwrap().greet(), "hello");
    }

    #[test]
    fn test_second_resolution_fails() {
        let slot: Deferred<dyn Greeter> = Deferred::new("greeter");
        slot.resolve(Arc::new(Hello)).unwrap();

        assert_eq!(
            slot.resolve(Arc::new(Hello)).unwrap_err(),
            DeferredError::AlreadyResolved("greeter")
        );
    }
}
