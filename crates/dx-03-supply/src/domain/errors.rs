use crate::domain::Capability;
use shared_types::{CodeType, ModuleError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupplyError {
    #[error("module account {0} has no entry in the permission table")]
    UnknownModuleAccount(String),

    #[error("permission table names {0}, which no registered module declares")]
    UndeclaredModuleAccount(String),

    #[error("module account {account} does not have {capability} permission")]
    MissingCapability {
        account: String,
        capability: Capability,
    },

    #[error("total supply overflow")]
    SupplyOverflow,

    #[error("burn of {amount} exceeds total supply {supply}")]
    SupplyUnderflow { amount: u128, supply: u128 },
}

impl From<SupplyError> for ModuleError {
    fn from(err: SupplyError) -> Self {
        match &err {
            SupplyError::UnknownModuleAccount(_) => {
                ModuleError::root(CodeType::UnknownAddress, err.to_string())
            }
            SupplyError::MissingCapability { .. } => ModuleError::unauthorized(err.to_string()),
            SupplyError::UndeclaredModuleAccount(_)
            | SupplyError::SupplyOverflow
            | SupplyError::SupplyUnderflow { .. } => ModuleError::invalid_coins(err.to_string()),
        }
    }
}
