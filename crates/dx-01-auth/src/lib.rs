//! # dx-01-auth
//!
//! Account bookkeeping for the application.
//!
//! ## Role in System
//!
//! - **Accounts**: address, balance, account number and sequence, stored in
//!   the `acc` namespace.
//! - **Ante step**: every transaction passes through [`AnteHandler`] before its
//!   messages run: message count, memo size, size gas, signer sequence and fee
//!   deduction into the `fee_collector` module account.
//! - **Fee collection port**: the fee transfer goes through the
//!   [`ports::FeeCollector`] trait, implemented by the supply module.
//!
//! ## Crate Structure
//!
//! - `domain/` - account, params, errors
//! - `keeper.rs` - `AccountKeeper`
//! - `ante.rs` - `AnteHandler`
//! - `genesis.rs` - genesis state, import and export
//! - `module.rs` - `AuthModuleBasic` / `AuthModule`

pub mod ante;
pub mod domain;
pub mod genesis;
pub mod keeper;
pub mod module;
pub mod ports;

pub use ante::AnteHandler;
pub use domain::*;
pub use genesis::AuthGenesis;
pub use keeper::AccountKeeper;
pub use module::{AuthModule, AuthModuleBasic};
pub use ports::FeeCollector;

/// Module name.
pub const MODULE_NAME: &str = "auth";

/// Store namespace.
pub const STORE_KEY: &str = "acc";

/// Querier route.
pub const QUERIER_ROUTE: &str = "acc";

/// Module account receiving transaction fees.
pub const FEE_COLLECTOR: &str = "fee_collector";
