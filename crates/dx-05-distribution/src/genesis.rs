use crate::domain::{DistrParams, FeePool, OutstandingRewards};
use crate::keeper::DistrKeeper;
use crate::DISTRIBUTION_ACCOUNT;
use serde::{Deserialize, Serialize};
use shared_types::{Context, ModuleError};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrGenesis {
    pub params: DistrParams,
    #[serde(default)]
    pub fee_pool: FeePool,
    #[serde(default)]
    pub outstanding_rewards: Vec<OutstandingRewards>,
}

impl DistrGenesis {
    pub fn validate(&self) -> Result<(), String> {
        self.params.validate()?;
        let mut seen = BTreeSet::new();
        for outstanding in &self.outstanding_rewards {
            if !seen.insert(outstanding.validator) {
                return Err(format!(
                    "duplicate outstanding rewards for {}",
                    outstanding.validator
                ));
            }
        }
        Ok(())
    }
}

pub fn init_genesis(
    keeper: &DistrKeeper,
    ctx: &mut Context<'_>,
    genesis: &DistrGenesis,
) -> Result<(), ModuleError> {
    keeper.set_params(ctx, &genesis.params)?;
    keeper.set_fee_pool(ctx, &genesis.fee_pool)?;
    for outstanding in &genesis.outstanding_rewards {
        keeper.set_outstanding_rewards(ctx, outstanding)?;
    }
    keeper.supply().get_module_account(ctx, DISTRIBUTION_ACCOUNT)?;
    Ok(())
}

pub fn export_genesis(keeper: &DistrKeeper, ctx: &Context<'_>) -> Result<DistrGenesis, ModuleError> {
    Ok(DistrGenesis {
        params: keeper.params(ctx)?,
        fee_pool: keeper.fee_pool(ctx)?,
        outstanding_rewards: keeper.all_outstanding_rewards(ctx)?,
    })
}
