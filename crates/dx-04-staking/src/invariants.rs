use crate::keeper::StakingKeeper;
use crate::{BONDED_POOL, MODULE_NAME, NOT_BONDED_POOL};
use shared_types::{Amount, Context, InvariantRegistry, ModuleError};
use std::sync::Arc;

pub const MODULE_ACCOUNTS_ROUTE: &str = "module-accounts";

pub fn register_invariants(registry: &mut InvariantRegistry, keeper: Arc<StakingKeeper>) {
    registry.register(MODULE_NAME, MODULE_ACCOUNTS_ROUTE, move |ctx| {
        module_accounts(&keeper, ctx)
    });
}

/// Pool balances equal the tokens of the validators they back.
pub fn module_accounts(keeper: &StakingKeeper, ctx: &Context<'_>) -> Result<Option<String>, ModuleError> {
    let mut bonded: Amount = 0;
    let mut not_bonded: Amount = 0;
    for validator in keeper.validators(ctx)? {
        if validator.is_bonded() {
            bonded = bonded.saturating_add(validator.tokens);
        } else {
            not_bonded = not_bonded.saturating_add(validator.tokens);
        }
    }

    let supply = keeper.supply();
    let bonded_pool = supply.module_balance(ctx, BONDED_POOL)?;
    let not_bonded_pool = supply.module_balance(ctx, NOT_BONDED_POOL)?;

    if bonded != bonded_pool || not_bonded != not_bonded_pool {
        return Ok(Some(format!(
            "bonded pool {} vs bonded tokens {}, not bonded pool {} vs unbonded tokens {}",
            bonded_pool, bonded, not_bonded_pool, not_bonded
        )));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::{ctx, fund, min_self, setup};
    use shared_types::Address;

    #[test]
    fn test_pools_match_validator_tokens() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let op = Address::new([1; 20]);
        fund(&keeper, &mut ctx, &op, min_self());
        keeper
            .create_validator(&mut ctx, &op, "aa", "", min_self())
            .unwrap();
        assert_eq!(module_accounts(&keeper, &ctx).unwrap(), None);

        keeper.apply_and_return_validator_set_updates(&mut ctx).unwrap();
        assert_eq!(module_accounts(&keeper, &ctx).unwrap(), None);

        // A stray deposit into the pool breaks the match.
        fund(&keeper, &mut ctx, &Address::for_module(BONDED_POOL), 1);
        assert!(module_accounts(&keeper, &ctx).unwrap().is_some());
    }
}
