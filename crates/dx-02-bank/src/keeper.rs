//! # Bank Keeper
//!
//! Owns the `bankx` namespace, which only holds [`BankParams`]. Balances live
//! in the auth module's accounts; fees go through the supply keeper.

use crate::domain::{BankError, BankParams};
use crate::EVENT_SEND_COINS;
use dx_01_auth::{AccountKeeper, FEE_COLLECTOR};
use dx_03_supply::SupplyKeeper;
use shared_types::{Address, Amount, Context, Event, ModuleError, StoreKey};
use std::sync::Arc;
use tracing::debug;

const PARAMS: &[u8] = b"p";

pub struct BankKeeper {
    key: StoreKey,
    accounts: Arc<AccountKeeper>,
    supply: Arc<SupplyKeeper>,
}

impl BankKeeper {
    #[must_use]
    pub fn new(key: StoreKey, accounts: Arc<AccountKeeper>, supply: Arc<SupplyKeeper>) -> Self {
        Self {
            key,
            accounts,
            supply,
        }
    }

    pub fn params(&self, ctx: &Context<'_>) -> Result<BankParams, ModuleError> {
        Ok(ctx.get_value(&self.key, PARAMS)?.unwrap_or_default())
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &BankParams) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, PARAMS, params)
    }

    pub fn balance(&self, ctx: &Context<'_>, addr: &Address) -> Result<Amount, ModuleError> {
        self.accounts.balance(ctx, addr)
    }

    /// Transfer `amount` from `from` to `to`, activating `to` if needed.
    ///
    /// Returns the amount the recipient actually received.
    pub fn send_coins(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Amount, ModuleError> {
        let params = self.params(ctx)?;
        if !params.send_enabled {
            return Err(BankError::SendDisabled.into());
        }
        if amount == 0 {
            return Err(BankError::ZeroAmount.into());
        }

        let mut received = amount;
        if !self.accounts.has_account(ctx, to)? {
            let fee = params.activation_fee_amount();
            if fee > 0 {
                if amount <= fee {
                    return Err(BankError::BelowActivationFee { amount, fee }.into());
                }
                self.supply
                    .send_coins_from_account_to_module(ctx, from, FEE_COLLECTOR, fee)?;
                received = amount - fee;
                debug!(address = %to, fee = %fee, "[bank] account activated");
            }
        }
        self.accounts.transfer(ctx, from, to, received)?;

        ctx.emit(
            Event::new("transfer")
                .with_attribute("recipient", to)
                .with_attribute("sender", from)
                .with_attribute("amount", received),
        );
        ctx.emit(
            Event::new(EVENT_SEND_COINS)
                .with_attribute("from", from)
                .with_attribute("to", to)
                .with_attribute("amount", amount),
        );
        Ok(received)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dx_03_supply::{Capability, PermissionTable};
    use shared_store::{CacheMultiStore, CommitMultiStore, InMemoryKVStore};
    use shared_types::{AllowList, BlockHeader};

    pub(crate) fn setup() -> (BankKeeper, CacheMultiStore) {
        let acc = StoreKey::new(dx_01_auth::STORE_KEY);
        let supply = StoreKey::new(dx_03_supply::STORE_KEY);
        let bank = StoreKey::new(crate::STORE_KEY);
        let mut store = CommitMultiStore::new(Arc::new(InMemoryKVStore::new()));
        for key in [&acc, &supply, &bank] {
            store.mount(key).unwrap();
        }

        let accounts = Arc::new(AccountKeeper::new(acc));
        let permissions = PermissionTable::new().with_account(FEE_COLLECTOR, [Capability::Basic]);
        let supply = Arc::new(SupplyKeeper::new(supply, accounts.clone(), permissions));
        (BankKeeper::new(bank, accounts, supply), store.cache_wrap())
    }

    pub(crate) fn ctx(cache: &mut CacheMultiStore) -> Context<'_> {
        Context::new(
            cache,
            BlockHeader::default(),
            Arc::new(AllowList::new([EVENT_SEND_COINS])),
        )
    }

    #[test]
    fn test_send_to_new_account_pays_activation_fee() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let alice = Address::new([1; 20]);
        let bob = Address::new([2; 20]);
        keeper.set_params(&mut ctx, &BankParams {
            activation_fee: 10,
            ..BankParams::default()
        })
        .unwrap();
        keeper.accounts.add_balance(&mut ctx, &alice, 100).unwrap();

        assert_eq!(keeper.send_coins(&mut ctx, &alice, &bob, 50).unwrap(), 40);
        // Bob exists now, so the second transfer is fee free.
        assert_eq!(keeper.send_coins(&mut ctx, &alice, &bob, 50).unwrap(), 50);

        assert_eq!(keeper.balance(&ctx, &alice).unwrap(), 0);
        assert_eq!(keeper.balance(&ctx, &bob).unwrap(), 90);
        assert_eq!(keeper.supply.module_balance(&ctx, FEE_COLLECTOR).unwrap(), 10);

        let published: Vec<_> = ctx.events().iter().filter(|e| e.publishable).collect();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].kind, EVENT_SEND_COINS);
    }

    #[test]
    fn test_send_rejections() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let alice = Address::new([1; 20]);
        let bob = Address::new([2; 20]);
        keeper.accounts.add_balance(&mut ctx, &alice, 1_000).unwrap();
        keeper.set_params(&mut ctx, &BankParams {
            activation_fee: 500,
            ..BankParams::default()
        })
        .unwrap();

        let err = keeper.send_coins(&mut ctx, &alice, &bob, 0).unwrap_err();
        assert_eq!(err.code, BankError::ZeroAmount.code());

        let err = keeper.send_coins(&mut ctx, &alice, &bob, 500).unwrap_err();
        assert_eq!(err.code, 105);

        keeper.set_params(&mut ctx, &BankParams {
            send_enabled: false,
            ..BankParams::default()
        })
        .unwrap();
        let err = keeper.send_coins(&mut ctx, &alice, &bob, 600).unwrap_err();
        assert_eq!(err.codespace, crate::CODESPACE);
        assert_eq!(err.code, BankError::SendDisabled.code());
    }
}
