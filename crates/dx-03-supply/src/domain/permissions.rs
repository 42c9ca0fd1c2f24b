//! # Account Permission Table
//!
//! Static mapping from module account name to the capabilities it holds.
//!
//! | Capability | Allows |
//! |------------|--------|
//! | `basic` | nothing beyond transfers; marks a plain module account |
//! | `mint` | creating new coins into the account |
//! | `burn` | destroying coins held by the account |
//! | `stake-lock` | receiving and returning delegated coins |
//!
//! Plain transfers (`send_coins_*`) only require the account to have an
//! entry, whatever its capabilities. Mint, burn and the delegation moves
//! check their own tag.

use crate::domain::SupplyError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Capability tag of a module account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Basic,
    Mint,
    Burn,
    StakeLock,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Capability::Basic => "basic",
            Capability::Mint => "mint",
            Capability::Burn => "burn",
            Capability::StakeLock => "stake-lock",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    entries: BTreeMap<String, BTreeSet<Capability>>,
}

impl PermissionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `capabilities` to the module account `name`.
    #[must_use]
    pub fn with_account<I>(mut self, name: &str, capabilities: I) -> Self
    where
        I: IntoIterator<Item = Capability>,
    {
        self.entries
            .entry(name.to_string())
            .or_default()
            .extend(capabilities);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn has(&self, name: &str, capability: Capability) -> bool {
        self.entries
            .get(name)
            .is_some_and(|caps| caps.contains(&capability))
    }

    pub fn capabilities(&self, name: &str) -> Option<&BTreeSet<Capability>> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every entry names a module account some registered module
    /// declared.
    pub fn validate_against<'a, I>(&self, declared: I) -> Result<(), SupplyError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let declared: BTreeSet<&str> = declared.into_iter().collect();
        match self.names().find(|name| !declared.contains(name)) {
            Some(name) => Err(SupplyError::UndeclaredModuleAccount(name.to_string())),
            None => Ok(()),
        }
    }

    /// Fail unless `name` holds `capability`.
    pub fn require(&self, name: &str, capability: Capability) -> Result<(), SupplyError> {
        if !self.contains(name) {
            return Err(SupplyError::UnknownModuleAccount(name.to_string()));
        }
        if !self.has(name, capability) {
            return Err(SupplyError::MissingCapability {
                account: name.to_string(),
                capability,
            });
        }
        Ok(())
    }
}
