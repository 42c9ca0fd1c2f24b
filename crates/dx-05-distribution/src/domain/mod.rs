use crate::BASIS_POINTS;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Address, Amount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrParams {
    /// Share of collected fees sent to the community pool, in basis points.
    pub community_tax_bp: u16,
}

impl Default for DistrParams {
    fn default() -> Self {
        Self {
            community_tax_bp: 200,
        }
    }
}

impl DistrParams {
    pub fn validate(&self) -> Result<(), String> {
        if u128::from(self.community_tax_bp) > BASIS_POINTS {
            return Err(format!(
                "community tax {} exceeds {} basis points",
                self.community_tax_bp, BASIS_POINTS
            ));
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePool {
    #[serde_as(as = "DisplayFromStr")]
    pub community_pool: Amount,
}

/// Rewards allocated to a validator and not yet withdrawn.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingRewards {
    pub validator: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub rewards: Amount,
}

/// A bonded validator as seen by distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorPower {
    pub operator: Address,
    pub power: u64,
}
