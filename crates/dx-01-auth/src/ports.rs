//! # Outbound Ports
//!
//! Dependencies the auth module needs from modules built on top of it.

use shared_types::{Address, Amount, Context, ModuleError};

/// Moves a transaction fee from the payer into the fee collector account.
///
/// Implemented by the supply keeper, which owns module accounts.
pub trait FeeCollector: Send + Sync {
    fn collect_fee(
        &self,
        ctx: &mut Context<'_>,
        payer: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError>;
}
