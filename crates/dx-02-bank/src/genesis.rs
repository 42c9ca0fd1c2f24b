use crate::domain::{BankError, BankParams};
use crate::keeper::BankKeeper;
use serde::{Deserialize, Serialize};
use shared_types::{Context, ModuleError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankGenesis {
    pub params: BankParams,
}

impl BankGenesis {
    pub fn validate(&self) -> Result<(), BankError> {
        self.params.validate()
    }
}

pub fn init_genesis(
    keeper: &BankKeeper,
    ctx: &mut Context<'_>,
    genesis: &BankGenesis,
) -> Result<(), ModuleError> {
    keeper.set_params(ctx, &genesis.params)
}

pub fn export_genesis(keeper: &BankKeeper, ctx: &Context<'_>) -> Result<BankGenesis, ModuleError> {
    Ok(BankGenesis {
        params: keeper.params(ctx)?,
    })
}
