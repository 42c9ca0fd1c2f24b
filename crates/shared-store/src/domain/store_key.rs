//! Store keys: capability tokens for a state namespace.

use crate::errors::StoreError;

/// Handle to one namespace of the multi-store.
///
/// Neither `Clone` nor `Copy`. The composition root mounts the key and moves
/// it into exactly one keeper, the only code able to address that namespace.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct StoreKey {
    name: &'static str,
}

impl StoreKey {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        let reason = if self.name.is_empty() {
            Some("name must not be empty")
        } else if self.name.contains('/') {
            Some("name must not contain '/'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StoreError::InvalidStoreName {
                name: self.name.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}
