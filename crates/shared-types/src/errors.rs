//! # Error Types
//!
//! - [`ModuleError`] - result of a message handler, querier or lifecycle hook.
//!   Carries an ABCI-style `(codespace, code)` pair that ends up in the
//!   transaction response. Errors flagged `fatal` halt the application.
//! - [`GenesisError`] - genesis decoding or validation failure.
//! - [`DeferredError`] - misuse of a deferred dependency slot.

use shared_store::StoreError;
use thiserror::Error;

/// Codespace for errors defined in this crate.
pub const ROOT_CODESPACE: &str = "sdk";

/// Root error codes shared by all modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CodeType {
    Ok = 0,
    Internal = 1,
    TxDecode = 2,
    InvalidSequence = 3,
    Unauthorized = 4,
    InsufficientFunds = 5,
    UnknownRequest = 6,
    InvalidAddress = 7,
    UnknownAddress = 9,
    InvalidCoins = 10,
    OutOfGas = 11,
    MemoTooLarge = 12,
    InsufficientFee = 13,
}

impl CodeType {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Failure of a module operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{codespace}] code {code}: {message}")]
pub struct ModuleError {
    pub codespace: String,
    pub code: u32,
    pub message: String,
    /// Set for failures the state machine cannot recover from
    /// (storage I/O, broken invariants).
    pub fatal: bool,
}

impl ModuleError {
    pub fn new(codespace: impl Into<String>, code: u32, message: impl Into<String>) -> Self {
        Self {
            codespace: codespace.into(),
            code,
            message: message.into(),
            fatal: false,
        }
    }

    /// Error in the root codespace.
    pub fn root(code: CodeType, message: impl Into<String>) -> Self {
        Self::new(ROOT_CODESPACE, code.as_u32(), message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::root(CodeType::Internal, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::root(CodeType::Unauthorized, message)
    }

    pub fn insufficient_funds(message: impl Into<String>) -> Self {
        Self::root(CodeType::InsufficientFunds, message)
    }

    pub fn unknown_request(message: impl Into<String>) -> Self {
        Self::root(CodeType::UnknownRequest, message)
    }

    pub fn invalid_coins(message: impl Into<String>) -> Self {
        Self::root(CodeType::InvalidCoins, message)
    }

    /// Mark the error as unrecoverable.
    #[must_use]
    pub fn into_fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub fn is_code(&self, code: CodeType) -> bool {
        self.codespace == ROOT_CODESPACE && self.code == code.as_u32()
    }
}

impl From<StoreError> for ModuleError {
    fn from(err: StoreError) -> Self {
        if err.is_out_of_gas() {
            ModuleError::root(CodeType::OutOfGas, err.to_string())
        } else {
            ModuleError::internal(err.to_string()).into_fatal()
        }
    }
}

impl From<serde_json::Error> for ModuleError {
    fn from(err: serde_json::Error) -> Self {
        ModuleError::root(CodeType::TxDecode, err.to_string())
    }
}

/// Genesis decoding or validation failure for one module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    #[error("failed to decode {module} genesis state: {message}")]
    Decode { module: String, message: String },

    #[error("invalid {module} genesis state: {message}")]
    Invalid { module: String, message: String },
}

impl GenesisError {
    pub fn decode(module: &str, err: impl std::fmt::Display) -> Self {
        GenesisError::Decode {
            module: module.to_string(),
            message: err.to_string(),
        }
    }

    pub fn invalid(module: &str, message: impl Into<String>) -> Self {
        GenesisError::Invalid {
            module: module.to_string(),
            message: message.into(),
        }
    }
}

/// Misuse of a deferred dependency slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeferredError {
    #[error("deferred dependency '{0}' resolved twice")]
    AlreadyResolved(&'static str),

    #[error("deferred dependency '{0}' used before it was resolved")]
    Unresolved(&'static str),
}

impl From<DeferredError> for ModuleError {
    fn from(err: DeferredError) -> Self {
        ModuleError::internal(err.to_string()).into_fatal()
    }
}
