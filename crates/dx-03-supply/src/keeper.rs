//! # Supply Keeper
//!
//! Owns the `supply` namespace (total supply) and moves coins in and out of
//! module accounts through the account keeper. Every module account transfer
//! consults the [`PermissionTable`].

use crate::domain::{Capability, PermissionTable, SupplyError};
use dx_01_auth::{Account, AccountKeeper, FeeCollector, FEE_COLLECTOR};
use shared_types::{Address, Amount, Context, Event, ModuleError, StoreKey};
use std::sync::Arc;
use tracing::debug;

const TOTAL_SUPPLY: &[u8] = b"t";

pub struct SupplyKeeper {
    key: StoreKey,
    accounts: Arc<AccountKeeper>,
    permissions: PermissionTable,
}

impl SupplyKeeper {
    #[must_use]
    pub fn new(key: StoreKey, accounts: Arc<AccountKeeper>, permissions: PermissionTable) -> Self {
        Self {
            key,
            accounts,
            permissions,
        }
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    pub fn accounts(&self) -> &Arc<AccountKeeper> {
        &self.accounts
    }

    pub fn module_address(name: &str) -> Address {
        Address::for_module(name)
    }

    pub fn total_supply(&self, ctx: &Context<'_>) -> Result<Amount, ModuleError> {
        Ok(ctx.get_value(&self.key, TOTAL_SUPPLY)?.unwrap_or_default())
    }

    pub fn set_total_supply(&self, ctx: &mut Context<'_>, supply: Amount) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, TOTAL_SUPPLY, &supply)
    }

    /// The module account `name`, created on first use.
    pub fn get_module_account(&self, ctx: &mut Context<'_>, name: &str) -> Result<Account, ModuleError> {
        if !self.permissions.contains(name) {
            return Err(SupplyError::UnknownModuleAccount(name.to_string()).into());
        }

        let addr = Self::module_address(name);
        if let Some(account) = self.accounts.get_account(ctx, &addr)? {
            return Ok(account);
        }

        let mut account = self.accounts.new_account(ctx, &addr)?;
        account.module_name = Some(name.to_string());
        self.accounts.set_account(ctx, &account)?;
        debug!(module_account = name, address = %addr, "[supply] created module account");
        Ok(account)
    }

    pub fn module_balance(&self, ctx: &Context<'_>, name: &str) -> Result<Amount, ModuleError> {
        self.accounts.balance(ctx, &Self::module_address(name))
    }

    pub fn send_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        let to = self.get_module_account(ctx, module)?.address;
        self.accounts.transfer(ctx, from, &to, amount)
    }

    pub fn send_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        let from = self.get_module_account(ctx, module)?.address;
        self.accounts.transfer(ctx, &from, to, amount)
    }

    pub fn send_coins_from_module_to_module(
        &self,
        ctx: &mut Context<'_>,
        from_module: &str,
        to_module: &str,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        let from = self.get_module_account(ctx, from_module)?.address;
        let to = self.get_module_account(ctx, to_module)?.address;
        self.accounts.transfer(ctx, &from, &to, amount)
    }

    /// Lock delegated coins in a stake-lock module account.
    pub fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        self.permissions.require(module, Capability::StakeLock)?;
        self.send_coins_from_account_to_module(ctx, from, module, amount)
    }

    pub fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        self.permissions.require(module, Capability::StakeLock)?;
        self.send_coins_from_module_to_account(ctx, module, to, amount)
    }

    pub fn mint_coins(&self, ctx: &mut Context<'_>, module: &str, amount: Amount) -> Result<(), ModuleError> {
        self.permissions.require(module, Capability::Mint)?;
        let addr = self.get_module_account(ctx, module)?.address;

        let supply = self
            .total_supply(ctx)?
            .checked_add(amount)
            .ok_or(SupplyError::SupplyOverflow)?;
        self.accounts.add_balance(ctx, &addr, amount)?;
        self.set_total_supply(ctx, supply)?;

        ctx.emit(
            Event::new("mint")
                .with_attribute("module", module)
                .with_attribute("amount", amount),
        );
        Ok(())
    }

    pub fn burn_coins(&self, ctx: &mut Context<'_>, module: &str, amount: Amount) -> Result<(), ModuleError> {
        self.permissions.require(module, Capability::Burn)?;
        let addr = self.get_module_account(ctx, module)?.address;

        let current = self.total_supply(ctx)?;
        let supply = current.checked_sub(amount).ok_or(SupplyError::SupplyUnderflow {
            amount,
            supply: current,
        })?;
        self.accounts.sub_balance(ctx, &addr, amount)?;
        self.set_total_supply(ctx, supply)?;

        ctx.emit(
            Event::new("burn")
                .with_attribute("module", module)
                .with_attribute("amount", amount),
        );
        Ok(())
    }
}

impl FeeCollector for SupplyKeeper {
    fn collect_fee(
        &self,
        ctx: &mut Context<'_>,
        payer: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        self.send_coins_from_account_to_module(ctx, payer, FEE_COLLECTOR, amount)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shared_store::{CacheMultiStore, CommitMultiStore, InMemoryKVStore};
    use shared_types::{AllowList, BlockHeader, CodeType};

    pub(crate) fn permissions() -> PermissionTable {
        PermissionTable::new()
            .with_account(FEE_COLLECTOR, [Capability::Basic])
            .with_account("minter", [Capability::Mint, Capability::Burn])
            .with_account("pool", [Capability::StakeLock])
    }

    pub(crate) fn setup() -> (SupplyKeeper, CacheMultiStore) {
        let acc = StoreKey::new(dx_01_auth::STORE_KEY);
        let supply = StoreKey::new(crate::STORE_KEY);
        let mut store = CommitMultiStore::new(Arc::new(InMemoryKVStore::new()));
        store.mount(&acc).unwrap();
        store.mount(&supply).unwrap();

        let accounts = Arc::new(AccountKeeper::new(acc));
        (
            SupplyKeeper::new(supply, accounts, permissions()),
            store.cache_wrap(),
        )
    }

    pub(crate) fn ctx(cache: &mut CacheMultiStore) -> Context<'_> {
        Context::new(cache, BlockHeader::default(), Arc::new(AllowList::empty()))
    }

    #[test]
    fn test_module_account_created_once() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);

        let first = keeper.get_module_account(&mut ctx, FEE_COLLECTOR).unwrap();
        let second = keeper.get_module_account(&mut ctx, FEE_COLLECTOR).unwrap();
        assert_eq!(first, second);
        assert!(first.is_module_account());
        assert_eq!(first.address, Address::for_module(FEE_COLLECTOR));

        let err = keeper.get_module_account(&mut ctx, "unknown").unwrap_err();
        assert!(err.is_code(CodeType::UnknownAddress));
    }

    #[test]
    fn test_transfers_need_only_a_table_entry() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        keeper.mint_coins(&mut ctx, "minter", 100).unwrap();

        // `pool` holds stake-lock only, yet takes and returns plain transfers.
        keeper
            .send_coins_from_module_to_module(&mut ctx, "minter", "pool", 60)
            .unwrap();
        keeper
            .send_coins_from_module_to_module(&mut ctx, "pool", FEE_COLLECTOR, 10)
            .unwrap();
        assert_eq!(keeper.module_balance(&ctx, "pool").unwrap(), 50);
        assert_eq!(keeper.module_balance(&ctx, FEE_COLLECTOR).unwrap(), 10);

        let err = keeper
            .send_coins_from_module_to_module(&mut ctx, "minter", "unknown", 10)
            .unwrap_err();
        assert!(err.is_code(CodeType::UnknownAddress));
        assert_eq!(keeper.module_balance(&ctx, "minter").unwrap(), 40);
    }

    #[test]
    fn test_mint_and_burn_move_supply() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);

        keeper.mint_coins(&mut ctx, "minter", 500).unwrap();
        keeper.burn_coins(&mut ctx, "minter", 200).unwrap();

        assert_eq!(keeper.total_supply(&ctx).unwrap(), 300);
        assert_eq!(keeper.module_balance(&ctx, "minter").unwrap(), 300);
        assert_eq!(ctx.events().len(), 2);
    }

    #[test]
    fn test_missing_capability_is_unauthorized() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);

        let err = keeper.mint_coins(&mut ctx, FEE_COLLECTOR, 1).unwrap_err();
        assert!(err.is_code(CodeType::Unauthorized));

        let alice = Address::new([1; 20]);
        keeper.accounts().add_balance(&mut ctx, &alice, 10).unwrap();
        let err = keeper
            .delegate_coins_from_account_to_module(&mut ctx, &alice, "minter", 5)
            .unwrap_err();
        assert!(err.is_code(CodeType::Unauthorized));
        assert_eq!(keeper.total_supply(&ctx).unwrap(), 0);
    }

    #[test]
    fn test_delegate_round_trip() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let alice = Address::new([1; 20]);
        keeper.accounts().add_balance(&mut ctx, &alice, 100).unwrap();

        keeper
            .delegate_coins_from_account_to_module(&mut ctx, &alice, "pool", 60)
            .unwrap();
        assert_eq!(keeper.module_balance(&ctx, "pool").unwrap(), 60);

        keeper
            .undelegate_coins_from_module_to_account(&mut ctx, "pool", &alice, 60)
            .unwrap();
        assert_eq!(keeper.accounts().balance(&ctx, &alice).unwrap(), 100);
    }

    #[test]
    fn test_fee_collection_goes_to_fee_collector() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let alice = Address::new([1; 20]);
        keeper.accounts().add_balance(&mut ctx, &alice, 100).unwrap();

        keeper.collect_fee(&mut ctx, &alice, 7).unwrap();
        assert_eq!(keeper.module_balance(&ctx, FEE_COLLECTOR).unwrap(), 7);
    }
}
