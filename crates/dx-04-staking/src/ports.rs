//! # Outbound Ports
//!
//! Callbacks staking makes into modules that track validator state.

use shared_types::{Address, Context, ModuleError};
use std::sync::Arc;

/// Staking lifecycle callbacks. All methods default to no-ops.
pub trait StakingHooks: Send + Sync {
    fn after_validator_created(&self, _ctx: &mut Context<'_>, _validator: &Address) -> Result<(), ModuleError> {
        Ok(())
    }

    fn after_validator_bonded(&self, _ctx: &mut Context<'_>, _validator: &Address) -> Result<(), ModuleError> {
        Ok(())
    }

    fn after_delegation_modified(
        &self,
        _ctx: &mut Context<'_>,
        _delegator: &Address,
        _validator: &Address,
    ) -> Result<(), ModuleError> {
        Ok(())
    }
}

/// Fan-out over several hook receivers, called in order.
#[derive(Default)]
pub struct MultiStakingHooks {
    hooks: Vec<Arc<dyn StakingHooks>>,
}

impl MultiStakingHooks {
    #[must_use]
    pub fn new(hooks: Vec<Arc<dyn StakingHooks>>) -> Self {
        Self { hooks }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl StakingHooks for MultiStakingHooks {
    fn after_validator_created(&self, ctx: &mut Context<'_>, validator: &Address) -> Result<(), ModuleError> {
        for hooks in &self.hooks {
            hooks.after_validator_created(ctx, validator)?;
        }
        Ok(())
    }

    fn after_validator_bonded(&self, ctx: &mut Context<'_>, validator: &Address) -> Result<(), ModuleError> {
        for hooks in &self.hooks {
            hooks.after_validator_bonded(ctx, validator)?;
        }
        Ok(())
    }

    fn after_delegation_modified(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
    ) -> Result<(), ModuleError> {
        for hooks in &self.hooks {
            hooks.after_delegation_modified(ctx, delegator, validator)?;
        }
        Ok(())
    }
}
