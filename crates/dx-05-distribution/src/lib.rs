//! # dx-05-distribution
//!
//! Distributes the fees collected in the previous block.
//!
//! At every begin-block the balance of the `fee_collector` module account is
//! moved to the `distribution` module account and split:
//!
//! ```text
//! collected ──▶ community tax (community_tax_bp / 10_000) ──▶ community pool
//!           └─▶ remainder, pro rata by power ──▶ validator outstanding rewards
//!                (rounding dust ──▶ community pool)
//! ```
//!
//! The bonded validator set is read through the [`ValidatorSet`] port. The
//! staking keeper is built after this keeper, so the port is held as a
//! [`shared_types::Deferred`] slot and bound by the composition root.

pub mod domain;
pub mod genesis;
pub mod invariants;
pub mod keeper;
pub mod module;
pub mod ports;

pub use domain::*;
pub use genesis::DistrGenesis;
pub use keeper::DistrKeeper;
pub use module::{DistrModule, DistrModuleBasic};
pub use ports::ValidatorSet;

/// Module name, store namespace, querier route and module account.
pub const MODULE_NAME: &str = "distribution";

/// Store namespace.
pub const STORE_KEY: &str = "distribution";

/// Module account holding undistributed rewards and the community pool.
pub const DISTRIBUTION_ACCOUNT: &str = "distribution";

/// Basis points denominator.
pub const BASIS_POINTS: u128 = 10_000;
