use crate::CODESPACE;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Address, Amount, InvariantViolation, ModuleError};
use thiserror::Error;

pub const TYPE_MSG_VERIFY_INVARIANT: &str = "verify_invariant";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisParams {
    /// Fee charged for an on-demand invariant check.
    #[serde_as(as = "DisplayFromStr")]
    pub constant_fee: Amount,
}

impl Default for CrisisParams {
    fn default() -> Self {
        Self {
            constant_fee: 1_000 * 100_000_000,
        }
    }
}

impl CrisisParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.constant_fee == 0 {
            return Err("constant_fee must be positive".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVerifyInvariant {
    pub sender: Address,
    pub invariant_module_name: String,
    pub invariant_route: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrisisError {
    #[error("unknown invariant {module}/{route}")]
    UnknownInvariant { module: String, route: String },

    #[error(transparent)]
    InvariantBroken(#[from] InvariantViolation),
}

impl From<CrisisError> for ModuleError {
    fn from(err: CrisisError) -> Self {
        match &err {
            CrisisError::UnknownInvariant { .. } => ModuleError::new(CODESPACE, 101, err.to_string()),
            CrisisError::InvariantBroken(_) => {
                ModuleError::new(CODESPACE, 102, err.to_string()).into_fatal()
            }
        }
    }
}
