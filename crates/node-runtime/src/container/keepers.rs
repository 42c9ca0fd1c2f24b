//! # Keeper Wiring
//!
//! Every keeper is built exactly once, in dependency order:
//!
//! ```text
//! accounts ─▶ supply ─▶ bank
//!                │
//!                ├────▶ staking ◀──── hooks ─────┐
//!                │         ▲                     │
//!                │         │ Deferred<ValidatorSet>
//!                └────▶ distribution ────────────┘
//! ```
//!
//! Distribution needs the bonded set before staking exists, and staking
//! calls back into distribution through its hooks. Distribution receives a
//! `Deferred` slot, staking is built, the slot is resolved, and the hooks are
//! attached last. Nothing is rebound afterwards.

use crate::adapters::{DistributionStakingHooks, StakingValidatorSet};
use crate::errors::AppError;
use dx_01_auth::{AccountKeeper, FEE_COLLECTOR};
use dx_02_bank::BankKeeper;
use dx_03_supply::{Capability, PermissionTable, SupplyKeeper};
use dx_04_staking::{MultiStakingHooks, StakingHooks, StakingKeeper, BONDED_POOL, NOT_BONDED_POOL};
use dx_05_distribution::{DistrKeeper, ValidatorSet, DISTRIBUTION_ACCOUNT};
use shared_store::CommitMultiStore;
use shared_types::{Deferred, ModuleError, StoreKey};
use std::sync::Arc;
use tracing::{debug, info};

/// Store key of the application's own namespace (chain id).
pub const MAIN_STORE_KEY: &str = "main";

/// Capabilities of every module account.
pub fn permission_table() -> PermissionTable {
    PermissionTable::new()
        .with_account(FEE_COLLECTOR, [Capability::Basic])
        .with_account(DISTRIBUTION_ACCOUNT, [Capability::Basic])
        .with_account(BONDED_POOL, [Capability::Burn, Capability::StakeLock])
        .with_account(NOT_BONDED_POOL, [Capability::Burn, Capability::StakeLock])
}

/// The keepers the business modules are built from.
pub struct Keepers {
    pub accounts: Arc<AccountKeeper>,
    pub supply: Arc<SupplyKeeper>,
    pub bank: Arc<BankKeeper>,
    pub staking: Arc<StakingKeeper>,
    pub distribution: Arc<DistrKeeper>,
    /// Already resolved; kept so the binding can be inspected.
    pub validator_set: Deferred<dyn ValidatorSet>,
}

/// Store keys, mounted before any keeper receives its own.
pub(crate) struct StoreKeys {
    pub main: StoreKey,
    pub accounts: StoreKey,
    pub bank: StoreKey,
    pub supply: StoreKey,
    pub staking: StoreKey,
    pub distribution: StoreKey,
    pub crisis: StoreKey,
}

impl StoreKeys {
    pub(crate) fn mount(store: &mut CommitMultiStore) -> Result<Self, AppError> {
        let keys = Self {
            main: StoreKey::new(MAIN_STORE_KEY),
            accounts: StoreKey::new(dx_01_auth::STORE_KEY),
            bank: StoreKey::new(dx_02_bank::STORE_KEY),
            supply: StoreKey::new(dx_03_supply::STORE_KEY),
            staking: StoreKey::new(dx_04_staking::STORE_KEY),
            distribution: StoreKey::new(dx_05_distribution::STORE_KEY),
            crisis: StoreKey::new(dx_06_crisis::STORE_KEY),
        };
        for key in [
            &keys.main,
            &keys.accounts,
            &keys.bank,
            &keys.supply,
            &keys.staking,
            &keys.distribution,
            &keys.crisis,
        ] {
            store.mount(key)?;
        }
        debug!(mounted = ?store.mounted_names(), "[container] store keys mounted");
        Ok(keys)
    }
}

impl Keepers {
    /// Build and cross-wire the keepers. Consumes the module store keys.
    pub(crate) fn build(
        accounts_key: StoreKey,
        bank_key: StoreKey,
        supply_key: StoreKey,
        staking_key: StoreKey,
        distribution_key: StoreKey,
        permissions: PermissionTable,
    ) -> Result<Self, AppError> {
        let accounts = Arc::new(AccountKeeper::new(accounts_key));
        let supply = Arc::new(SupplyKeeper::new(supply_key, Arc::clone(&accounts), permissions));
        let bank = Arc::new(BankKeeper::new(bank_key, Arc::clone(&accounts), Arc::clone(&supply)));

        let validator_set: Deferred<dyn ValidatorSet> = Deferred::new("validator set");
        let distribution = Arc::new(DistrKeeper::new(
            distribution_key,
            Arc::clone(&supply),
            validator_set.clone(),
        ));
        let staking = Arc::new(StakingKeeper::new(staking_key, Arc::clone(&supply)));

        validator_set.resolve(Arc::new(StakingValidatorSet::new(Arc::clone(&staking))))?;
        let hooks: Vec<Arc<dyn StakingHooks>> =
            vec![Arc::new(DistributionStakingHooks::new(Arc::clone(&distribution)))];
        staking
            .set_hooks(Arc::new(MultiStakingHooks::new(hooks)))
            .map_err(ModuleError::from)?;

        info!("[container] keepers wired (staking <-> distribution bound)");
        Ok(Self {
            accounts,
            supply,
            bank,
            staking,
            distribution,
            validator_set,
        })
    }
}
