//! Distribution's view of the bonded set, served by the staking keeper.

use dx_04_staking::StakingKeeper;
use dx_05_distribution::{ValidatorPower, ValidatorSet};
use shared_types::{Context, ModuleError};
use std::sync::Arc;

pub struct StakingValidatorSet {
    staking: Arc<StakingKeeper>,
}

impl StakingValidatorSet {
    #[must_use]
    pub fn new(staking: Arc<StakingKeeper>) -> Self {
        Self { staking }
    }
}

impl ValidatorSet for StakingValidatorSet {
    fn bonded_validators(&self, ctx: &Context<'_>) -> Result<Vec<ValidatorPower>, ModuleError> {
        Ok(self
            .staking
            .bonded_validators(ctx)?
            .into_iter()
            .map(|v| ValidatorPower {
                operator: v.operator,
                power: v.power(),
            })
            .collect())
    }
}
