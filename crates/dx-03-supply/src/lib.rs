//! # dx-03-supply
//!
//! Total supply tracking and module account custody.
//!
//! ## Role in System
//!
//! - **Module accounts**: accounts owned by a module rather than a key
//!   holder (`fee_collector`, `distribution`, staking pools). Created lazily
//!   on first use, addressed by `Keccak256(name)[12..]`.
//! - **Permission table**: every module account is granted a set of
//!   [`Capability`] tags at startup. Mint, burn and stake-lock transfers are
//!   refused unless the table grants the tag.
//! - **Total supply**: moved by mint and burn only, checked against the sum
//!   of all balances by the `total-supply` invariant.
//!
//! ```text
//!  account ──send/delegate──▶ module account ──send/undelegate──▶ account
//!                                   │
//!                         mint ─────┼───── burn   (supply +/-)
//! ```

pub mod domain;
pub mod genesis;
pub mod invariants;
pub mod keeper;
pub mod module;

pub use domain::*;
pub use genesis::SupplyGenesis;
pub use keeper::SupplyKeeper;
pub use module::{SupplyModule, SupplyModuleBasic};

/// Module name.
pub const MODULE_NAME: &str = "supply";

/// Store namespace.
pub const STORE_KEY: &str = "supply";

/// Querier route.
pub const QUERIER_ROUTE: &str = "supply";
