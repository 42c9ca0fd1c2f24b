//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports that module crates declare
//! and cannot satisfy themselves, because the implementing module is built
//! on top of them.
//!
//! ```text
//! ┌──────────────────┐  ValidatorSet        ┌──────────────────┐
//! │   distribution   │ ───────────────────▶ │     staking      │
//! │                  │ ◀─────────────────── │                  │
//! └──────────────────┘  StakingHooks        └──────────────────┘
//!
//! ┌──────────────────┐  GenesisTxDeliverer  ┌──────────────────┐
//! │     genutil      │ ───────────────────▶ │    TxRunner      │
//! └──────────────────┘                      └──────────────────┘
//! ```
//!
//! Each adapter is installed into a `Deferred` slot or a keeper setter by the
//! composition root, after both sides exist.

pub mod genesis_tx;
pub mod staking_hooks;
pub mod validator_set;

pub use genesis_tx::GenesisTxAdapter;
pub use staking_hooks::DistributionStakingHooks;
pub use validator_set::StakingValidatorSet;
