//! # Staking Keeper
//!
//! Owns the `staking` namespace.
//!
//! ## Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `p` | `StakingParams` |
//! | `v/<operator>` | `Validator` |
//! | `c/<pub_key>` | operator `Address` |
//! | `d/<delegator><validator>` | `Delegation` |
//! | `l/<operator>` | `LastValidatorPower` |
//! | `t` | last total power (`u64`) |

use crate::domain::{BondStatus, Delegation, LastValidatorPower, StakingError, StakingParams, Validator};
use crate::ports::StakingHooks;
use crate::{BONDED_POOL, EVENT_CREATE_VALIDATOR, NOT_BONDED_POOL};
use dx_03_supply::SupplyKeeper;
use shared_types::{Address, Amount, Context, Event, ModuleError, StoreKey, ValidatorUpdate};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

const PARAMS: &[u8] = b"p";
const VALIDATOR_PREFIX: &[u8] = b"v/";
const PUB_KEY_PREFIX: &[u8] = b"c/";
const DELEGATION_PREFIX: &[u8] = b"d/";
const LAST_POWER_PREFIX: &[u8] = b"l/";
const LAST_TOTAL_POWER: &[u8] = b"t";

fn prefixed(prefix: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut key = prefix.to_vec();
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

fn pool_for(status: BondStatus) -> &'static str {
    match status {
        BondStatus::Bonded => BONDED_POOL,
        BondStatus::Unbonded => NOT_BONDED_POOL,
    }
}

pub struct StakingKeeper {
    key: StoreKey,
    supply: Arc<SupplyKeeper>,
    hooks: OnceLock<Arc<dyn StakingHooks>>,
}

impl StakingKeeper {
    #[must_use]
    pub fn new(key: StoreKey, supply: Arc<SupplyKeeper>) -> Self {
        Self {
            key,
            supply,
            hooks: OnceLock::new(),
        }
    }

    /// Attach the hook receiver. Hooks can be set once.
    pub fn set_hooks(&self, hooks: Arc<dyn StakingHooks>) -> Result<(), StakingError> {
        self.hooks
            .set(hooks)
            .map_err(|_| StakingError::HooksAlreadySet)
    }

    pub fn has_hooks(&self) -> bool {
        self.hooks.get().is_some()
    }

    pub fn supply(&self) -> &Arc<SupplyKeeper> {
        &self.supply
    }

    // =========================================================================
    // PARAMS
    // =========================================================================

    pub fn params(&self, ctx: &Context<'_>) -> Result<StakingParams, ModuleError> {
        Ok(ctx.get_value(&self.key, PARAMS)?.unwrap_or_default())
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &StakingParams) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, PARAMS, params)
    }

    // =========================================================================
    // VALIDATORS
    // =========================================================================

    pub fn validator(&self, ctx: &Context<'_>, operator: &Address) -> Result<Option<Validator>, ModuleError> {
        ctx.get_value(&self.key, &prefixed(VALIDATOR_PREFIX, &[operator.as_bytes()]))
    }

    pub fn set_validator(&self, ctx: &mut Context<'_>, validator: &Validator) -> Result<(), ModuleError> {
        ctx.set_value(
            &self.key,
            &prefixed(VALIDATOR_PREFIX, &[validator.operator.as_bytes()]),
            validator,
        )
    }

    pub fn validator_by_pub_key(&self, ctx: &Context<'_>, pub_key: &str) -> Result<Option<Address>, ModuleError> {
        ctx.get_value(&self.key, &prefixed(PUB_KEY_PREFIX, &[pub_key.as_bytes()]))
    }

    pub(crate) fn set_pub_key_index(&self, ctx: &mut Context<'_>, validator: &Validator) -> Result<(), ModuleError> {
        ctx.set_value(
            &self.key,
            &prefixed(PUB_KEY_PREFIX, &[validator.pub_key.as_bytes()]),
            &validator.operator,
        )
    }

    /// All validators in operator address order.
    pub fn validators(&self, ctx: &Context<'_>) -> Result<Vec<Validator>, ModuleError> {
        Ok(ctx
            .iter_values::<Validator>(&self.key, VALIDATOR_PREFIX)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    pub fn bonded_validators(&self, ctx: &Context<'_>) -> Result<Vec<Validator>, ModuleError> {
        Ok(self
            .validators(ctx)?
            .into_iter()
            .filter(Validator::is_bonded)
            .collect())
    }

    // =========================================================================
    // DELEGATIONS
    // =========================================================================

    pub fn delegation(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Option<Delegation>, ModuleError> {
        ctx.get_value(
            &self.key,
            &prefixed(DELEGATION_PREFIX, &[delegator.as_bytes(), validator.as_bytes()]),
        )
    }

    pub fn set_delegation(&self, ctx: &mut Context<'_>, delegation: &Delegation) -> Result<(), ModuleError> {
        ctx.set_value(
            &self.key,
            &prefixed(
                DELEGATION_PREFIX,
                &[delegation.delegator.as_bytes(), delegation.validator.as_bytes()],
            ),
            delegation,
        )
    }

    pub fn delegations(&self, ctx: &Context<'_>) -> Result<Vec<Delegation>, ModuleError> {
        Ok(ctx
            .iter_values::<Delegation>(&self.key, DELEGATION_PREFIX)?
            .into_iter()
            .map(|(_, d)| d)
            .collect())
    }

    // =========================================================================
    // LAST VALIDATOR SET
    // =========================================================================

    pub fn last_validator_powers(&self, ctx: &Context<'_>) -> Result<Vec<LastValidatorPower>, ModuleError> {
        Ok(ctx
            .iter_values::<LastValidatorPower>(&self.key, LAST_POWER_PREFIX)?
            .into_iter()
            .map(|(_, p)| p)
            .collect())
    }

    pub fn set_last_validator_power(
        &self,
        ctx: &mut Context<'_>,
        power: &LastValidatorPower,
    ) -> Result<(), ModuleError> {
        ctx.set_value(
            &self.key,
            &prefixed(LAST_POWER_PREFIX, &[power.address.as_bytes()]),
            power,
        )
    }

    fn delete_last_validator_power(&self, ctx: &mut Context<'_>, operator: &Address) -> Result<(), ModuleError> {
        ctx.delete(&self.key, &prefixed(LAST_POWER_PREFIX, &[operator.as_bytes()]))
    }

    pub fn last_total_power(&self, ctx: &Context<'_>) -> Result<u64, ModuleError> {
        Ok(ctx.get_value(&self.key, LAST_TOTAL_POWER)?.unwrap_or_default())
    }

    pub fn set_last_total_power(&self, ctx: &mut Context<'_>, power: u64) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, LAST_TOTAL_POWER, &power)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Register a validator and self-delegate `self_delegation`.
    pub fn create_validator(
        &self,
        ctx: &mut Context<'_>,
        operator: &Address,
        pub_key: &str,
        moniker: &str,
        self_delegation: Amount,
    ) -> Result<(), ModuleError> {
        let params = self.params(ctx)?;
        if self.validator(ctx, operator)?.is_some() {
            return Err(StakingError::ValidatorExists(*operator).into());
        }
        validate_pub_key(pub_key)?;
        if self.validator_by_pub_key(ctx, pub_key)?.is_some() {
            return Err(StakingError::PubKeyInUse(pub_key.to_string()).into());
        }
        if self_delegation < params.min_self_delegation {
            return Err(StakingError::SelfDelegationTooLow {
                min: params.min_self_delegation,
                got: self_delegation,
            }
            .into());
        }

        let validator = Validator::new(*operator, pub_key, moniker, params.min_self_delegation);
        self.set_validator(ctx, &validator)?;
        self.set_pub_key_index(ctx, &validator)?;
        if let Some(hooks) = self.hooks.get() {
            hooks.after_validator_created(ctx, operator)?;
        }

        self.delegate(ctx, operator, operator, self_delegation)?;

        ctx.emit(
            Event::new(EVENT_CREATE_VALIDATOR)
                .with_attribute("validator", operator)
                .with_attribute("pub_key", pub_key)
                .with_attribute("amount", self_delegation),
        );
        info!(validator = %operator, "[staking] validator created");
        Ok(())
    }

    /// Lock `amount` of the delegator's tokens with `validator`.
    pub fn delegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount.into());
        }
        let mut record = self
            .validator(ctx, validator)?
            .ok_or(StakingError::UnknownValidator(*validator))?;

        self.supply.delegate_coins_from_account_to_module(
            ctx,
            delegator,
            pool_for(record.status),
            amount,
        )?;

        record.tokens += amount;
        record.delegator_shares += amount;
        self.set_validator(ctx, &record)?;

        let mut delegation = self
            .delegation(ctx, delegator, validator)?
            .unwrap_or(Delegation {
                delegator: *delegator,
                validator: *validator,
                shares: 0,
            });
        delegation.shares += amount;
        self.set_delegation(ctx, &delegation)?;

        if let Some(hooks) = self.hooks.get() {
            hooks.after_delegation_modified(ctx, delegator, validator)?;
        }

        ctx.emit(
            Event::new("delegate")
                .with_attribute("delegator", delegator)
                .with_attribute("validator", validator)
                .with_attribute("amount", amount),
        );
        Ok(())
    }

    /// Recompute the consensus validator set and return the changes.
    ///
    /// The new set is the top `max_validators` validators with non-zero power,
    /// ordered by power, then operator address. Validators leaving the set get
    /// a zero-power update.
    pub fn apply_and_return_validator_set_updates(
        &self,
        ctx: &mut Context<'_>,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let params = self.params(ctx)?;

        let mut candidates: Vec<Validator> = self
            .validators(ctx)?
            .into_iter()
            .filter(|v| v.power() > 0)
            .collect();
        candidates.sort_by(|a, b| b.power().cmp(&a.power()).then(a.operator.cmp(&b.operator)));
        candidates.truncate(usize::from(params.max_validators));

        let mut last: BTreeMap<Address, u64> = self
            .last_validator_powers(ctx)?
            .into_iter()
            .map(|p| (p.address, p.power))
            .collect();

        let mut updates = Vec::new();
        let mut total_power = 0u64;
        for mut validator in candidates {
            let power = validator.power();
            if !validator.is_bonded() {
                self.supply.send_coins_from_module_to_module(
                    ctx,
                    NOT_BONDED_POOL,
                    BONDED_POOL,
                    validator.tokens,
                )?;
                validator.status = BondStatus::Bonded;
                self.set_validator(ctx, &validator)?;
                if let Some(hooks) = self.hooks.get() {
                    hooks.after_validator_bonded(ctx, &validator.operator)?;
                }
            }

            if last.remove(&validator.operator) != Some(power) {
                updates.push(validator.update());
                self.set_last_validator_power(
                    ctx,
                    &LastValidatorPower {
                        address: validator.operator,
                        power,
                    },
                )?;
            }
            total_power = total_power.saturating_add(power);
        }

        // Whatever is left in `last` dropped out of the set.
        for operator in last.into_keys() {
            self.delete_last_validator_power(ctx, &operator)?;
            let Some(mut validator) = self.validator(ctx, &operator)? else {
                continue;
            };
            if validator.is_bonded() {
                self.supply.send_coins_from_module_to_module(
                    ctx,
                    BONDED_POOL,
                    NOT_BONDED_POOL,
                    validator.tokens,
                )?;
                validator.status = BondStatus::Unbonded;
                self.set_validator(ctx, &validator)?;
            }
            updates.push(validator.zero_update());
        }

        self.set_last_total_power(ctx, total_power)?;
        if !updates.is_empty() {
            debug!(
                updates = updates.len(),
                total_power, "[staking] validator set changed"
            );
        }
        Ok(updates)
    }
}

pub(crate) fn validate_pub_key(pub_key: &str) -> Result<(), StakingError> {
    match hex::decode(pub_key) {
        Ok(bytes) if !bytes.is_empty() => Ok(()),
        _ => Err(StakingError::InvalidPubKey(pub_key.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::POWER_REDUCTION;
    use dx_01_auth::{AccountKeeper, FEE_COLLECTOR};
    use dx_03_supply::{Capability, PermissionTable};
    use shared_store::{CacheMultiStore, CommitMultiStore, InMemoryKVStore};
    use shared_types::{AllowList, BlockHeader};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl StakingHooks for Recorder {
        fn after_validator_created(&self, _ctx: &mut Context<'_>, v: &Address) -> Result<(), ModuleError> {
            self.calls.lock().unwrap().push(format!("created {}", v));
            Ok(())
        }

        fn after_validator_bonded(&self, _ctx: &mut Context<'_>, v: &Address) -> Result<(), ModuleError> {
            self.calls.lock().unwrap().push(format!("bonded {}", v));
            Ok(())
        }
    }

    pub(crate) fn permissions() -> PermissionTable {
        PermissionTable::new()
            .with_account(FEE_COLLECTOR, [Capability::Basic])
            .with_account(BONDED_POOL, [Capability::Burn, Capability::StakeLock])
            .with_account(NOT_BONDED_POOL, [Capability::Burn, Capability::StakeLock])
    }

    pub(crate) fn setup() -> (StakingKeeper, CacheMultiStore) {
        let acc = StoreKey::new(dx_01_auth::STORE_KEY);
        let supply = StoreKey::new(dx_03_supply::STORE_KEY);
        let staking = StoreKey::new(crate::STORE_KEY);
        let mut store = CommitMultiStore::new(Arc::new(InMemoryKVStore::new()));
        for key in [&acc, &supply, &staking] {
            store.mount(key).unwrap();
        }

        let accounts = Arc::new(AccountKeeper::new(acc));
        let supply = Arc::new(SupplyKeeper::new(supply, accounts, permissions()));
        (StakingKeeper::new(staking, supply), store.cache_wrap())
    }

    pub(crate) fn ctx(cache: &mut CacheMultiStore) -> Context<'_> {
        Context::new(cache, BlockHeader::default(), Arc::new(AllowList::empty()))
    }

    pub(crate) fn fund(keeper: &StakingKeeper, ctx: &mut Context<'_>, addr: &Address, amount: Amount) {
        keeper
            .supply()
            .accounts()
            .add_balance(ctx, addr, amount)
            .unwrap();
    }

    pub(crate) fn min_self() -> Amount {
        StakingParams::default().min_self_delegation
    }

    #[test]
    fn test_create_validator_locks_self_delegation() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let op = Address::new([1; 20]);
        fund(&keeper, &mut ctx, &op, min_self() * 2);

        keeper
            .create_validator(&mut ctx, &op, "aa01", "first", min_self())
            .unwrap();

        let validator = keeper.validator(&ctx, &op).unwrap().unwrap();
        assert_eq!(validator.tokens, min_self());
        assert!(!validator.is_bonded());
        assert_eq!(keeper.supply().module_balance(&ctx, NOT_BONDED_POOL).unwrap(), min_self());
        assert_eq!(keeper.supply().accounts().balance(&ctx, &op).unwrap(), min_self());
        assert_eq!(keeper.delegation(&ctx, &op, &op).unwrap().unwrap().shares, min_self());
    }

    #[test]
    fn test_create_validator_rejections() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let op = Address::new([1; 20]);
        fund(&keeper, &mut ctx, &op, min_self() * 3);

        let err = keeper
            .create_validator(&mut ctx, &op, "aa01", "", min_self() - 1)
            .unwrap_err();
        assert_eq!(err.code, 105);

        let err = keeper
            .create_validator(&mut ctx, &op, "not-hex", "", min_self())
            .unwrap_err();
        assert_eq!(err.code, 103);

        keeper
            .create_validator(&mut ctx, &op, "aa01", "", min_self())
            .unwrap();
        let err = keeper
            .create_validator(&mut ctx, &op, "aa02", "", min_self())
            .unwrap_err();
        assert_eq!(err.code, 101);

        let other = Address::new([2; 20]);
        fund(&keeper, &mut ctx, &other, min_self());
        let err = keeper
            .create_validator(&mut ctx, &other, "aa01", "", min_self())
            .unwrap_err();
        assert_eq!(err.code, 102);
    }

    #[test]
    fn test_validator_set_updates_respect_max_validators() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        keeper
            .set_params(&mut ctx, &StakingParams {
                max_validators: 2,
                ..StakingParams::default()
            })
            .unwrap();

        let ops: Vec<Address> = (1..=3u8).map(|i| Address::new([i; 20])).collect();
        for (i, op) in ops.iter().enumerate() {
            let stake = min_self() + POWER_REDUCTION * i as u128;
            fund(&keeper, &mut ctx, op, stake * 2);
            keeper
                .create_validator(&mut ctx, op, &format!("0{}", i + 1), "", stake)
                .unwrap();
        }

        let updates = keeper.apply_and_return_validator_set_updates(&mut ctx).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].pub_key, "03");
        assert_eq!(updates[1].pub_key, "02");
        assert!(!keeper.validator(&ctx, &ops[0]).unwrap().unwrap().is_bonded());

        // Nothing changed: no updates.
        assert!(keeper
            .apply_and_return_validator_set_updates(&mut ctx)
            .unwrap()
            .is_empty());

        // Validator 1 overtakes validator 2.
        keeper
            .delegate(&mut ctx, &ops[0], &ops[0], POWER_REDUCTION * 5)
            .unwrap();
        let updates = keeper.apply_and_return_validator_set_updates(&mut ctx).unwrap();
        assert!(updates.contains(&ValidatorUpdate::new("02", 0)));
        assert!(updates.iter().any(|u| u.pub_key == "01" && u.power > 0));
        assert!(!keeper.validator(&ctx, &ops[1]).unwrap().unwrap().is_bonded());

        let bonded: Amount = keeper
            .bonded_validators(&ctx)
            .unwrap()
            .iter()
            .map(|v| v.tokens)
            .sum();
        assert_eq!(keeper.supply().module_balance(&ctx, BONDED_POOL).unwrap(), bonded);
    }

    #[test]
    fn test_hooks_fire_and_can_be_set_once() {
        let (keeper, mut cache) = setup();
        let recorder = Arc::new(Recorder::default());
        keeper.set_hooks(recorder.clone()).unwrap();
        assert_eq!(
            keeper.set_hooks(Arc::new(Recorder::default())).unwrap_err(),
            StakingError::HooksAlreadySet
        );

        let mut ctx = ctx(&mut cache);
        let op = Address::new([1; 20]);
        fund(&keeper, &mut ctx, &op, min_self());
        keeper
            .create_validator(&mut ctx, &op, "aa", "", min_self())
            .unwrap();
        keeper.apply_and_return_validator_set_updates(&mut ctx).unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("created"));
        assert!(calls[1].starts_with("bonded"));
    }
}
