//! # Execution Context
//!
//! The handle a module receives for every hook, handler and querier call:
//! the block working set, the block header, the event manager and the gas
//! meter of the current scope.
//!
//! Store access is metered. A transaction context carries the transaction's
//! gas limit; block, genesis and query contexts use an infinite meter.
//!
//! Keepers usually go through the typed helpers, which encode values with
//! `bincode`:
//!
//! ```ignore
//! let account: Option<Account> = ctx.get_value(&self.key, &account_key(&addr))?;
//! ctx.set_value(&self.key, &account_key(&addr), &account)?;
//! ```

use crate::entities::{Address, BlockHeader};
use crate::errors::ModuleError;
use crate::events::{AllowList, Event, EventManager};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_store::{CacheMultiStore, GasConfig, GasMeter, StoreKey};
use std::sync::Arc;

/// Execution context over a block working set.
pub struct Context<'a> {
    store: &'a mut CacheMultiStore,
    header: BlockHeader,
    events: EventManager,
    gas_meter: GasMeter,
    gas_config: GasConfig,
    signer: Option<Address>,
}

impl<'a> Context<'a> {
    /// Context with an infinite gas meter.
    pub fn new(store: &'a mut CacheMultiStore, header: BlockHeader, allow_list: Arc<AllowList>) -> Self {
        Self {
            store,
            header,
            events: EventManager::new(allow_list),
            gas_meter: GasMeter::infinite(),
            gas_config: GasConfig::default(),
            signer: None,
        }
    }

    #[must_use]
    pub fn with_gas_limit(mut self, limit: u64) -> Self {
        self.gas_meter = GasMeter::new(limit);
        self
    }

    #[must_use]
    pub fn with_gas_config(mut self, config: GasConfig) -> Self {
        self.gas_config = config;
        self
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Replace the signer, returning the previous one.
    pub fn set_signer(&mut self, signer: Option<Address>) -> Option<Address> {
        std::mem::replace(&mut self.signer, signer)
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn block_height(&self) -> u64 {
        self.header.height
    }

    pub fn block_time(&self) -> u64 {
        self.header.time
    }

    pub fn chain_id(&self) -> &str {
        &self.header.chain_id
    }

    /// Signer of the transaction being executed, if any.
    pub fn signer(&self) -> Option<&Address> {
        self.signer.as_ref()
    }

    /// Fail with `Unauthorized` unless `addr` signed the current transaction.
    pub fn require_signer(&self, addr: &Address) -> Result<(), ModuleError> {
        match &self.signer {
            Some(signer) if signer == addr => Ok(()),
            _ => Err(ModuleError::unauthorized(format!(
                "{} did not sign the transaction",
                addr
            ))),
        }
    }

    pub fn gas_meter(&self) -> &GasMeter {
        &self.gas_meter
    }

    pub fn gas_consumed(&self) -> u64 {
        self.gas_meter.consumed()
    }

    pub fn consume_gas(&self, amount: u64, descriptor: &str) -> Result<(), ModuleError> {
        self.gas_meter.consume(amount, descriptor)?;
        Ok(())
    }

    // =========================================================================
    // RAW STORE ACCESS
    // =========================================================================

    pub fn get(&self, key: &StoreKey, k: &[u8]) -> Result<Option<Vec<u8>>, ModuleError> {
        self.consume_gas(self.gas_config.read_cost_flat, "ReadFlat")?;
        let value = self.store.get(key, k)?;
        if let Some(v) = &value {
            self.consume_gas(
                self.gas_config.read_cost_per_byte * v.len() as u64,
                "ReadPerByte",
            )?;
        }
        Ok(value)
    }

    pub fn has(&self, key: &StoreKey, k: &[u8]) -> Result<bool, ModuleError> {
        self.consume_gas(self.gas_config.has_cost, "Has")?;
        Ok(self.store.has(key, k)?)
    }

    pub fn set(&mut self, key: &StoreKey, k: &[u8], value: Vec<u8>) -> Result<(), ModuleError> {
        self.consume_gas(self.gas_config.write_cost_flat, "WriteFlat")?;
        self.consume_gas(
            self.gas_config.write_cost_per_byte * value.len() as u64,
            "WritePerByte",
        )?;
        self.store.set(key, k, value)?;
        Ok(())
    }

    pub fn delete(&mut self, key: &StoreKey, k: &[u8]) -> Result<(), ModuleError> {
        self.consume_gas(self.gas_config.delete_cost, "Delete")?;
        self.store.delete(key, k)?;
        Ok(())
    }

    /// Entries under `prefix` in ascending key order, keys relative to the
    /// namespace.
    pub fn iter_prefix(
        &self,
        key: &StoreKey,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, ModuleError> {
        let entries = self.store.iter_prefix(key, prefix)?;
        for (_, v) in &entries {
            self.consume_gas(self.gas_config.iter_next_cost_flat, "IterNextFlat")?;
            self.consume_gas(
                self.gas_config.read_cost_per_byte * v.len() as u64,
                "ValuePerByte",
            )?;
        }
        Ok(entries)
    }

    // =========================================================================
    // TYPED ACCESS (bincode)
    // =========================================================================

    pub fn get_value<T: DeserializeOwned>(
        &self,
        key: &StoreKey,
        k: &[u8],
    ) -> Result<Option<T>, ModuleError> {
        match self.get(key, k)? {
            Some(bytes) => decode_value(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_value<T: Serialize>(
        &mut self,
        key: &StoreKey,
        k: &[u8],
        value: &T,
    ) -> Result<(), ModuleError> {
        let bytes = bincode::serialize(value).map_err(|e| {
            ModuleError::internal(format!("failed to encode value in '{}': {}", key, e))
        })?;
        self.set(key, k, bytes)
    }

    /// Decoded values under `prefix`, keys relative to the namespace.
    pub fn iter_values<T: DeserializeOwned>(
        &self,
        key: &StoreKey,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, T)>, ModuleError> {
        self.iter_prefix(key, prefix)?
            .into_iter()
            .map(|(k, bytes)| decode_value(key, &bytes).map(|v| (k, v)))
            .collect()
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    pub fn emit(&mut self, event: Event) {
        self.events.emit(event);
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take()
    }
}

fn decode_value<T: DeserializeOwned>(key: &StoreKey, bytes: &[u8]) -> Result<T, ModuleError> {
    bincode::deserialize(bytes).map_err(|e| {
        ModuleError::internal(format!("corrupted value in '{}': {}", key, e)).into_fatal()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_store::{CommitMultiStore, InMemoryKVStore};

    fn store_with(key: &StoreKey) -> CommitMultiStore {
        let mut store = CommitMultiStore::new(Arc::new(InMemoryKVStore::new()));
        store.mount(key).unwrap();
        store
    }

    #[test]
    fn test_typed_roundtrip_through_context() {
        let key = StoreKey::new("acc");
        let store = store_with(&key);
        let mut cache = store.cache_wrap();
        let mut ctx = Context::new(&mut cache, BlockHeader::default(), Arc::new(AllowList::empty()));

        ctx.set_value(&key, b"n", &42u64).unwrap();
        assert_eq!(ctx.get_value::<u64>(&key, b"n").unwrap(), Some(42));
        assert_eq!(ctx.get_value::<u64>(&key, b"missing").unwrap(), None);
    }

    #[test]
    fn test_gas_limit_stops_store_access() {
        let key = StoreKey::new("acc");
        let store = store_with(&key);
        let mut cache = store.cache_wrap();
        let mut ctx = Context::new(&mut cache, BlockHeader::default(), Arc::new(AllowList::empty()))
            .with_gas_limit(2500);

        ctx.set(&key, b"a", vec![1]).unwrap();
        let err = ctx.get(&key, b"a").unwrap_err();
        assert!(err.is_code(crate::errors::CodeType::OutOfGas));
        assert!(ctx.gas_consumed() > 2500);
    }

    #[test]
    fn test_require_signer() {
        let key = StoreKey::new("acc");
        let store = store_with(&key);
        let mut cache = store.cache_wrap();
        let signer = Address::new([3; 20]);
        let ctx = Context::new(&mut cache, BlockHeader::default(), Arc::new(AllowList::empty()))
            .with_signer(signer);

        assert!(ctx.require_signer(&signer).is_ok());
        assert!(ctx.require_signer(&Address::new([4; 20])).is_err());
    }
}
