use shared_types::{Address, Amount, CodeType, ModuleError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("account {0} does not exist")]
    UnknownAccount(Address),

    #[error("insufficient funds: {address} has {available}, needs {required}")]
    InsufficientFunds {
        address: Address,
        available: Amount,
        required: Amount,
    },

    #[error("balance overflow for {0}")]
    BalanceOverflow(Address),

    #[error("invalid sequence: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },

    #[error("memo too large: {len} > {max} characters")]
    MemoTooLarge { len: usize, max: u64 },

    #[error("transaction must contain at least one message")]
    NoMessages,
}

impl From<AuthError> for ModuleError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::UnknownAccount(_) => CodeType::UnknownAddress,
            AuthError::InsufficientFunds { .. } => CodeType::InsufficientFunds,
            AuthError::BalanceOverflow(_) => CodeType::InvalidCoins,
            AuthError::InvalidSequence { .. } => CodeType::InvalidSequence,
            AuthError::MemoTooLarge { .. } => CodeType::MemoTooLarge,
            AuthError::NoMessages => CodeType::UnknownRequest,
        };
        ModuleError::root(code, err.to_string())
    }
}
