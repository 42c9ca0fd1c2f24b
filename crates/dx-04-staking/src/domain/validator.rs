//! Validator and delegation entities.

use crate::POWER_REDUCTION;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Address, Amount, ValidatorUpdate};

/// Bonding status of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    Unbonded,
    Bonded,
}

/// Validator record
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator: Address,
    /// Hex-encoded consensus public key
    pub pub_key: String,
    pub moniker: String,
    pub status: BondStatus,
    #[serde_as(as = "DisplayFromStr")]
    pub tokens: Amount,
    #[serde_as(as = "DisplayFromStr")]
    pub delegator_shares: Amount,
    #[serde_as(as = "DisplayFromStr")]
    pub min_self_delegation: Amount,
}

impl Validator {
    /// Create an unbonded validator without tokens
    pub fn new(
        operator: Address,
        pub_key: impl Into<String>,
        moniker: impl Into<String>,
        min_self_delegation: Amount,
    ) -> Self {
        Self {
            operator,
            pub_key: pub_key.into(),
            moniker: moniker.into(),
            status: BondStatus::Unbonded,
            tokens: 0,
            delegator_shares: 0,
            min_self_delegation,
        }
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    /// Consensus power: tokens divided by [`POWER_REDUCTION`].
    pub fn power(&self) -> u64 {
        u64::try_from(self.tokens / POWER_REDUCTION).unwrap_or(u64::MAX)
    }

    pub fn update(&self) -> ValidatorUpdate {
        ValidatorUpdate::new(self.pub_key.clone(), self.power())
    }

    /// Update removing the validator from the consensus set.
    pub fn zero_update(&self) -> ValidatorUpdate {
        ValidatorUpdate::new(self.pub_key.clone(), 0)
    }
}

/// Shares a delegator holds in a validator. Shares are minted one per token.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: Address,
    pub validator: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub shares: Amount,
}

/// Power a validator had in the last applied validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastValidatorPower {
    pub address: Address,
    pub power: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_truncates_below_reduction() {
        let mut validator = Validator::new(Address::new([1; 20]), "ab", "v", 0);
        validator.tokens = POWER_REDUCTION * 3 + POWER_REDUCTION / 2;
        assert_eq!(validator.power(), 3);
        assert_eq!(validator.zero_update().power, 0);
        assert_eq!(validator.update(), ValidatorUpdate::new("ab", 3));
    }
}
