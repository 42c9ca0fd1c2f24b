//! # Distribution Keeper
//!
//! ## Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `p` | `DistrParams` |
//! | `f` | `FeePool` |
//! | `o/<validator>` | `OutstandingRewards` |

use crate::domain::{DistrParams, FeePool, OutstandingRewards};
use crate::ports::ValidatorSet;
use crate::{BASIS_POINTS, DISTRIBUTION_ACCOUNT};
use dx_01_auth::FEE_COLLECTOR;
use dx_03_supply::SupplyKeeper;
use shared_types::{Address, Amount, Context, Deferred, Event, ModuleError, StoreKey};
use std::sync::Arc;
use tracing::debug;

const PARAMS: &[u8] = b"p";
const FEE_POOL: &[u8] = b"f";
const OUTSTANDING_PREFIX: &[u8] = b"o/";

fn outstanding_key(validator: &Address) -> Vec<u8> {
    let mut key = OUTSTANDING_PREFIX.to_vec();
    key.extend_from_slice(validator.as_bytes());
    key
}

pub struct DistrKeeper {
    key: StoreKey,
    supply: Arc<SupplyKeeper>,
    validators: Deferred<dyn ValidatorSet>,
}

impl DistrKeeper {
    #[must_use]
    pub fn new(key: StoreKey, supply: Arc<SupplyKeeper>, validators: Deferred<dyn ValidatorSet>) -> Self {
        Self {
            key,
            supply,
            validators,
        }
    }

    pub fn supply(&self) -> &Arc<SupplyKeeper> {
        &self.supply
    }

    pub fn params(&self, ctx: &Context<'_>) -> Result<DistrParams, ModuleError> {
        Ok(ctx.get_value(&self.key, PARAMS)?.unwrap_or_default())
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &DistrParams) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, PARAMS, params)
    }

    pub fn fee_pool(&self, ctx: &Context<'_>) -> Result<FeePool, ModuleError> {
        Ok(ctx.get_value(&self.key, FEE_POOL)?.unwrap_or_default())
    }

    pub fn set_fee_pool(&self, ctx: &mut Context<'_>, pool: &FeePool) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, FEE_POOL, pool)
    }

    pub fn outstanding_rewards(&self, ctx: &Context<'_>, validator: &Address) -> Result<Amount, ModuleError> {
        Ok(ctx
            .get_value::<OutstandingRewards>(&self.key, &outstanding_key(validator))?
            .map_or(0, |o| o.rewards))
    }

    pub fn set_outstanding_rewards(
        &self,
        ctx: &mut Context<'_>,
        outstanding: &OutstandingRewards,
    ) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, &outstanding_key(&outstanding.validator), outstanding)
    }

    pub fn all_outstanding_rewards(&self, ctx: &Context<'_>) -> Result<Vec<OutstandingRewards>, ModuleError> {
        Ok(ctx
            .iter_values::<OutstandingRewards>(&self.key, OUTSTANDING_PREFIX)?
            .into_iter()
            .map(|(_, o)| o)
            .collect())
    }

    /// Start reward tracking for a new validator. Existing records are kept.
    pub fn initialize_validator(&self, ctx: &mut Context<'_>, validator: &Address) -> Result<(), ModuleError> {
        if ctx.has(&self.key, &outstanding_key(validator))? {
            return Ok(());
        }
        self.set_outstanding_rewards(
            ctx,
            &OutstandingRewards {
                validator: *validator,
                rewards: 0,
            },
        )
    }

    /// Move collected fees into the distribution account and split them.
    pub fn allocate_tokens(&self, ctx: &mut Context<'_>) -> Result<(), ModuleError> {
        let collected = self.supply.module_balance(ctx, FEE_COLLECTOR)?;
        if collected == 0 {
            return Ok(());
        }
        self.supply
            .send_coins_from_module_to_module(ctx, FEE_COLLECTOR, DISTRIBUTION_ACCOUNT, collected)?;

        let validators = self.validators.get()?.bonded_validators(ctx)?;
        let total_power: u128 = validators.iter().map(|v| u128::from(v.power)).sum();

        let mut distributed: Amount = 0;
        if total_power > 0 {
            let tax_bp = u128::from(self.params(ctx)?.community_tax_bp);
            let for_validators = collected - collected * tax_bp / BASIS_POINTS;

            for validator in &validators {
                let reward = for_validators * u128::from(validator.power) / total_power;
                if reward == 0 {
                    continue;
                }
                let current = self.outstanding_rewards(ctx, &validator.operator)?;
                self.set_outstanding_rewards(
                    ctx,
                    &OutstandingRewards {
                        validator: validator.operator,
                        rewards: current + reward,
                    },
                )?;
                distributed += reward;

                ctx.emit(
                    Event::new("rewards")
                        .with_attribute("validator", validator.operator)
                        .with_attribute("amount", reward),
                );
            }
        }

        let mut pool = self.fee_pool(ctx)?;
        pool.community_pool += collected - distributed;
        self.set_fee_pool(ctx, &pool)?;

        debug!(
            collected = %collected,
            distributed = %distributed,
            validators = validators.len(),
            "[distribution] fees allocated"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::ValidatorPower;
    use dx_01_auth::AccountKeeper;
    use dx_03_supply::{Capability, PermissionTable};
    use shared_store::{CacheMultiStore, CommitMultiStore, InMemoryKVStore};
    use shared_types::{AllowList, BlockHeader};

    pub(crate) struct FixedSet(pub Vec<ValidatorPower>);

    impl ValidatorSet for FixedSet {
        fn bonded_validators(&self, _ctx: &Context<'_>) -> Result<Vec<ValidatorPower>, ModuleError> {
            Ok(self.0.clone())
        }
    }

    pub(crate) fn setup(set: Vec<ValidatorPower>) -> (DistrKeeper, CacheMultiStore) {
        let acc = StoreKey::new(dx_01_auth::STORE_KEY);
        let supply = StoreKey::new(dx_03_supply::STORE_KEY);
        let distr = StoreKey::new(crate::STORE_KEY);
        let mut store = CommitMultiStore::new(Arc::new(InMemoryKVStore::new()));
        for key in [&acc, &supply, &distr] {
            store.mount(key).unwrap();
        }

        let permissions = PermissionTable::new()
            .with_account(FEE_COLLECTOR, [Capability::Basic])
            .with_account(DISTRIBUTION_ACCOUNT, [Capability::Basic]);
        let supply = Arc::new(SupplyKeeper::new(
            supply,
            Arc::new(AccountKeeper::new(acc)),
            permissions,
        ));
        let validators: Deferred<dyn ValidatorSet> = Deferred::new("validator set");
        validators.resolve(Arc::new(FixedSet(set))).unwrap();
        (DistrKeeper::new(distr, supply, validators), store.cache_wrap())
    }

    pub(crate) fn ctx(cache: &mut CacheMultiStore) -> Context<'_> {
        Context::new(cache, BlockHeader::default(), Arc::new(AllowList::empty()))
    }

    pub(crate) fn collect_fees(keeper: &DistrKeeper, ctx: &mut Context<'_>, amount: Amount) {
        let payer = Address::new([9; 20]);
        keeper.supply().accounts().add_balance(ctx, &payer, amount).unwrap();
        keeper
            .supply()
            .send_coins_from_account_to_module(ctx, &payer, FEE_COLLECTOR, amount)
            .unwrap();
    }

    #[test]
    fn test_allocation_splits_by_power() {
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);
        let (keeper, mut cache) = setup(vec![
            ValidatorPower { operator: a, power: 3 },
            ValidatorPower { operator: b, power: 1 },
        ]);
        let mut ctx = ctx(&mut cache);
        collect_fees(&keeper, &mut ctx, 10_001);

        keeper.allocate_tokens(&mut ctx).unwrap();

        // 2% tax: 10_001 - 200 = 9_801 for validators.
        assert_eq!(keeper.outstanding_rewards(&ctx, &a).unwrap(), 7_350);
        assert_eq!(keeper.outstanding_rewards(&ctx, &b).unwrap(), 2_450);
        assert_eq!(keeper.fee_pool(&ctx).unwrap().community_pool, 201);
        assert_eq!(keeper.supply().module_balance(&ctx, FEE_COLLECTOR).unwrap(), 0);
        assert_eq!(
            keeper.supply().module_balance(&ctx, DISTRIBUTION_ACCOUNT).unwrap(),
            10_001
        );
    }

    #[test]
    fn test_no_bonded_validators_feeds_community_pool() {
        let (keeper, mut cache) = setup(Vec::new());
        let mut ctx = ctx(&mut cache);
        collect_fees(&keeper, &mut ctx, 500);

        keeper.allocate_tokens(&mut ctx).unwrap();
        assert_eq!(keeper.fee_pool(&ctx).unwrap().community_pool, 500);
    }

    #[test]
    fn test_unresolved_validator_set_is_fatal() {
        let (keeper, mut cache) = setup(Vec::new());
        let unbound = DistrKeeper::new(
            StoreKey::new("unused"),
            keeper.supply().clone(),
            Deferred::new("validator set"),
        );
        let mut ctx = ctx(&mut cache);
        collect_fees(&keeper, &mut ctx, 5);

        let err = unbound.allocate_tokens(&mut ctx).unwrap_err();
        assert!(err.fatal);
    }

    #[test]
    fn test_initialize_keeps_existing_rewards() {
        let a = Address::new([1; 20]);
        let (keeper, mut cache) = setup(Vec::new());
        let mut ctx = ctx(&mut cache);
        keeper
            .set_outstanding_rewards(&mut ctx, &OutstandingRewards { validator: a, rewards: 9 })
            .unwrap();

        keeper.initialize_validator(&mut ctx, &a).unwrap();
        assert_eq!(keeper.outstanding_rewards(&ctx, &a).unwrap(), 9);
    }
}
