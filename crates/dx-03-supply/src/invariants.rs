use crate::keeper::SupplyKeeper;
use crate::MODULE_NAME;
use shared_types::{Amount, Context, InvariantRegistry, ModuleError};
use std::sync::Arc;

pub const TOTAL_SUPPLY_ROUTE: &str = "total-supply";

pub fn register_invariants(registry: &mut InvariantRegistry, keeper: Arc<SupplyKeeper>) {
    registry.register(MODULE_NAME, TOTAL_SUPPLY_ROUTE, move |ctx| {
        total_supply(&keeper, ctx)
    });
}

/// Sum of every account balance equals the recorded total supply.
pub fn total_supply(keeper: &SupplyKeeper, ctx: &Context<'_>) -> Result<Option<String>, ModuleError> {
    let mut sum: Amount = 0;
    for account in keeper.accounts().accounts(ctx)? {
        sum = sum.saturating_add(account.balance);
    }

    let supply = keeper.total_supply(ctx)?;
    if sum == supply {
        Ok(None)
    } else {
        Ok(Some(format!(
            "sum of balances {} does not match total supply {}",
            sum, supply
        )))
    }
}
