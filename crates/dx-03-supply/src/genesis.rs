//! Supply genesis state.
//!
//! A zero supply in the genesis file means "derive it": the import sums the
//! balances the auth module already imported.

use crate::keeper::SupplyKeeper;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Amount, Context, ModuleError};

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyGenesis {
    #[serde_as(as = "DisplayFromStr")]
    pub supply: Amount,
}

pub fn init_genesis(
    keeper: &SupplyKeeper,
    ctx: &mut Context<'_>,
    genesis: &SupplyGenesis,
) -> Result<(), ModuleError> {
    let supply = if genesis.supply == 0 {
        keeper
            .accounts()
            .accounts(ctx)?
            .iter()
            .fold(0u128, |sum, account| sum.saturating_add(account.balance))
    } else {
        genesis.supply
    };
    keeper.set_total_supply(ctx, supply)
}

pub fn export_genesis(keeper: &SupplyKeeper, ctx: &Context<'_>) -> Result<SupplyGenesis, ModuleError> {
    Ok(SupplyGenesis {
        supply: keeper.total_supply(ctx)?,
    })
}
