//! # dx-04-staking
//!
//! Validators, delegations and the consensus validator set.
//!
//! ## Role in System
//!
//! - `create_validator` registers an operator with a consensus key and a self
//!   delegation of at least `min_self_delegation`.
//! - `delegate` locks tokens with a validator. Tokens of bonded validators sit
//!   in the `bonded_tokens_pool` module account, all others in
//!   `not_bonded_tokens_pool`.
//! - At end-block the top `max_validators` validators by power form the new
//!   consensus set. Newly bonded and unbonded validators move their tokens
//!   between pools; changed powers are returned as validator updates.
//!
//! ## Hooks
//!
//! Modules that track per-validator state (distribution) register
//! [`StakingHooks`] once, after both keepers exist:
//!
//! ```text
//! StakingKeeper ──after_validator_created──▶ hooks
//!               ──after_validator_bonded───▶
//!               ──after_delegation_modified▶
//! ```

pub mod domain;
pub mod genesis;
pub mod handler;
pub mod invariants;
pub mod keeper;
pub mod module;
pub mod ports;

pub use domain::*;
pub use genesis::StakingGenesis;
pub use keeper::StakingKeeper;
pub use module::{StakingModule, StakingModuleBasic};
pub use ports::{MultiStakingHooks, StakingHooks};

/// Module name.
pub const MODULE_NAME: &str = "staking";

/// Store namespace, message route and querier route.
pub const STORE_KEY: &str = "staking";

/// Codespace of staking-specific errors.
pub const CODESPACE: &str = "staking";

/// Module account holding the tokens of bonded validators.
pub const BONDED_POOL: &str = "bonded_tokens_pool";

/// Module account holding the tokens of unbonded validators.
pub const NOT_BONDED_POOL: &str = "not_bonded_tokens_pool";

/// Tokens per unit of consensus power.
pub const POWER_REDUCTION: u128 = 100_000_000;

/// Publishable event kind emitted when a validator is created.
pub const EVENT_CREATE_VALIDATOR: &str = "create_validator";
