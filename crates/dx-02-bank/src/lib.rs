//! # dx-02-bank
//!
//! Coin transfers between accounts.
//!
//! ## Rules
//!
//! - Transfers require the sender's signature and a positive amount.
//! - Sending to an address that has no account yet activates it. The
//!   `activation_fee` is taken out of the transferred amount and paid to the
//!   fee collector; the transfer must exceed the fee.
//! - `send_enabled = false` rejects every transfer.
//!
//! Every transfer emits a `transfer` event and a publishable `send_coins`
//! event.

pub mod domain;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod module;

pub use domain::*;
pub use genesis::BankGenesis;
pub use keeper::BankKeeper;
pub use module::{BankModule, BankModuleBasic};

/// Module name.
pub const MODULE_NAME: &str = "bankx";

/// Store namespace, message route and querier route.
pub const STORE_KEY: &str = "bankx";

/// Codespace of bank-specific errors.
pub const CODESPACE: &str = "bankx";

/// Publishable event kind emitted for every transfer.
pub const EVENT_SEND_COINS: &str = "send_coins";
