use crate::CODESPACE;
use shared_types::{Address, Amount, ModuleError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    #[error("validator {0} already exists")]
    ValidatorExists(Address),

    #[error("consensus key {0} is already bound to a validator")]
    PubKeyInUse(String),

    #[error("invalid consensus key {0}")]
    InvalidPubKey(String),

    #[error("validator {0} does not exist")]
    UnknownValidator(Address),

    #[error("self delegation {got} is below the minimum {min}")]
    SelfDelegationTooLow { min: Amount, got: Amount },

    #[error("delegation amount must be positive")]
    ZeroAmount,

    #[error("staking hooks already set")]
    HooksAlreadySet,
}

impl StakingError {
    pub fn code(&self) -> u32 {
        match self {
            StakingError::ValidatorExists(_) => 101,
            StakingError::PubKeyInUse(_) => 102,
            StakingError::InvalidPubKey(_) => 103,
            StakingError::UnknownValidator(_) => 104,
            StakingError::SelfDelegationTooLow { .. } => 105,
            StakingError::ZeroAmount => 106,
            StakingError::HooksAlreadySet => 107,
        }
    }
}

impl From<StakingError> for ModuleError {
    fn from(err: StakingError) -> Self {
        ModuleError::new(CODESPACE, err.code(), err.to_string())
    }
}
