//! # Outbound Ports

use crate::domain::ValidatorPower;
use shared_types::{Context, ModuleError};

/// Read access to the bonded validator set.
///
/// Implemented over the staking keeper by the node runtime.
pub trait ValidatorSet: Send + Sync {
    /// Bonded validators with their consensus power, in a deterministic order.
    fn bonded_validators(&self, ctx: &Context<'_>) -> Result<Vec<ValidatorPower>, ModuleError>;
}
