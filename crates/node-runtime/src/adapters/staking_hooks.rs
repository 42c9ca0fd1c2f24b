//! Staking hooks that keep distribution's per-validator records in step.

use dx_04_staking::StakingHooks;
use dx_05_distribution::DistrKeeper;
use shared_types::{Address, Context, ModuleError};
use std::sync::Arc;
use tracing::debug;

pub struct DistributionStakingHooks {
    distribution: Arc<DistrKeeper>,
}

impl DistributionStakingHooks {
    #[must_use]
    pub fn new(distribution: Arc<DistrKeeper>) -> Self {
        Self { distribution }
    }
}

impl StakingHooks for DistributionStakingHooks {
    fn after_validator_created(&self, ctx: &mut Context<'_>, validator: &Address) -> Result<(), ModuleError> {
        debug!(validator = %validator, "[hooks] initializing distribution records");
        self.distribution.initialize_validator(ctx, validator)
    }
}
