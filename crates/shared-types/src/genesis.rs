//! Application genesis state: a JSON object keyed by module name.

use crate::errors::{GenesisError, ModuleError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decode a module's genesis blob.
pub fn decode_module_genesis<T: DeserializeOwned>(
    module: &str,
    genesis: &serde_json::Value,
) -> Result<T, GenesisError> {
    T::deserialize(genesis).map_err(|e| GenesisError::decode(module, e))
}

/// Encode a module's exported genesis state.
pub fn encode_module_genesis<T: Serialize>(
    module: &str,
    state: &T,
) -> Result<serde_json::Value, ModuleError> {
    serde_json::to_value(state).map_err(|e| {
        ModuleError::internal(format!("failed to encode {} genesis: {}", module, e))
    })
}

/// Module name -> module genesis blob.
///
/// Backed by a `BTreeMap`, so serialization is canonical: identical states
/// always serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppState(BTreeMap<String, serde_json::Value>);

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn get(&self, module: &str) -> Option<&serde_json::Value> {
        self.0.get(module)
    }

    pub fn insert(&mut self, module: impl Into<String>, genesis: serde_json::Value) {
        self.0.insert(module.into(), genesis);
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
