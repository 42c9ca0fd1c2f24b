use crate::keeper::DistrKeeper;
use crate::{DISTRIBUTION_ACCOUNT, MODULE_NAME};
use shared_types::{Amount, Context, InvariantRegistry, ModuleError};
use std::sync::Arc;

pub const CAN_WITHDRAW_ROUTE: &str = "can-withdraw";

pub fn register_invariants(registry: &mut InvariantRegistry, keeper: Arc<DistrKeeper>) {
    registry.register(MODULE_NAME, CAN_WITHDRAW_ROUTE, move |ctx| can_withdraw(&keeper, ctx));
}

/// The distribution account holds at least every outstanding reward plus the
/// community pool.
pub fn can_withdraw(keeper: &DistrKeeper, ctx: &Context<'_>) -> Result<Option<String>, ModuleError> {
    let owed: Amount = keeper
        .all_outstanding_rewards(ctx)?
        .iter()
        .fold(keeper.fee_pool(ctx)?.community_pool, |sum, o| {
            sum.saturating_add(o.rewards)
        });
    let held = keeper.supply().module_balance(ctx, DISTRIBUTION_ACCOUNT)?;

    if held < owed {
        return Ok(Some(format!(
            "distribution account holds {} but owes {}",
            held, owed
        )));
    }
    Ok(None)
}
