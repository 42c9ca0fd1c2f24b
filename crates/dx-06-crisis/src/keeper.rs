//! # Crisis Keeper
//!
//! Holds the frozen invariant registry built during application assembly.

use crate::types::{CrisisError, CrisisParams};
use dx_01_auth::FEE_COLLECTOR;
use dx_03_supply::SupplyKeeper;
use shared_types::{Address, Context, Event, InvariantRegistry, InvariantViolation, ModuleError, StoreKey};
use std::sync::Arc;
use tracing::{debug, error};

const PARAMS: &[u8] = b"p";

pub struct CrisisKeeper {
    key: StoreKey,
    registry: Arc<InvariantRegistry>,
    inv_check_period: u64,
    supply: Arc<SupplyKeeper>,
}

impl CrisisKeeper {
    #[must_use]
    pub fn new(
        key: StoreKey,
        registry: Arc<InvariantRegistry>,
        inv_check_period: u64,
        supply: Arc<SupplyKeeper>,
    ) -> Self {
        Self {
            key,
            registry,
            inv_check_period,
            supply,
        }
    }

    pub fn registry(&self) -> &Arc<InvariantRegistry> {
        &self.registry
    }

    pub fn inv_check_period(&self) -> u64 {
        self.inv_check_period
    }

    /// Whether the invariants run at `height`.
    pub fn should_check(&self, height: u64) -> bool {
        self.inv_check_period > 0 && height % self.inv_check_period == 0
    }

    pub fn params(&self, ctx: &Context<'_>) -> Result<CrisisParams, ModuleError> {
        Ok(ctx.get_value(&self.key, PARAMS)?.unwrap_or_default())
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &CrisisParams) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, PARAMS, params)
    }

    /// Run every registered invariant. A violation is a fatal error.
    pub fn assert_invariants(&self, ctx: &Context<'_>) -> Result<(), ModuleError> {
        debug!(
            height = ctx.block_height(),
            invariants = self.registry.len(),
            "[crisis] asserting invariants"
        );
        if let Err(violation) = self.registry.assert_all(ctx)? {
            error!(height = ctx.block_height(), "[crisis] {}", violation);
            return Err(CrisisError::from(violation).into());
        }
        Ok(())
    }

    /// Charge `sender` the constant fee and run one invariant.
    pub fn verify_invariant(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        module: &str,
        route: &str,
    ) -> Result<(), ModuleError> {
        let fee = self.params(ctx)?.constant_fee;
        self.supply
            .send_coins_from_account_to_module(ctx, sender, FEE_COLLECTOR, fee)?;

        let invariant = self
            .registry
            .find(module, route)
            .ok_or_else(|| CrisisError::UnknownInvariant {
                module: module.to_string(),
                route: route.to_string(),
            })?;

        if let Some(message) = invariant.check(ctx)? {
            let violation = InvariantViolation {
                module: invariant.module,
                route: invariant.route,
                message,
            };
            error!(sender = %sender, "[crisis] {}", violation);
            return Err(CrisisError::from(violation).into());
        }

        ctx.emit(
            Event::new("invariant")
                .with_attribute("route", invariant.full_route())
                .with_attribute("sender", sender),
        );
        Ok(())
    }
}
