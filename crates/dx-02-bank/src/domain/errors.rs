use crate::CODESPACE;
use shared_types::{Amount, ModuleError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("invalid activation fee {0}")]
    InvalidActivationFee(i64),

    #[error("invalid lock coins fee {0}")]
    InvalidLockCoinsFee(i64),

    #[error("transfers are disabled")]
    SendDisabled,

    #[error("transfer amount must be positive")]
    ZeroAmount,

    #[error("amount {amount} does not cover the activation fee {fee}")]
    BelowActivationFee { amount: Amount, fee: Amount },
}

impl BankError {
    pub fn code(&self) -> u32 {
        match self {
            BankError::InvalidActivationFee(_) => 101,
            BankError::InvalidLockCoinsFee(_) => 102,
            BankError::SendDisabled => 103,
            BankError::ZeroAmount => 104,
            BankError::BelowActivationFee { .. } => 105,
        }
    }
}

impl From<BankError> for ModuleError {
    fn from(err: BankError) -> Self {
        ModuleError::new(CODESPACE, err.code(), err.to_string())
    }
}
