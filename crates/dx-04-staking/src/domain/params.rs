use crate::POWER_REDUCTION;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::Amount;

/// Staking parameters.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    pub unbonding_time_secs: u64,
    pub max_validators: u16,
    pub bond_denom: String,
    /// Lower bound on a validator's self delegation.
    #[serde_as(as = "DisplayFromStr")]
    pub min_self_delegation: Amount,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            unbonding_time_secs: 21 * 24 * 3600,
            max_validators: 42,
            bond_denom: "cet".to_string(),
            min_self_delegation: 10_000 * POWER_REDUCTION,
        }
    }
}

impl StakingParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_validators == 0 {
            return Err("max_validators must be positive".to_string());
        }
        if self.bond_denom.trim().is_empty() {
            return Err("bond_denom cannot be blank".to_string());
        }
        if self.min_self_delegation == 0 {
            return Err("min_self_delegation must be positive".to_string());
        }
        Ok(())
    }
}
