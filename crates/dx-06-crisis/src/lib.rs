//! # dx-06-crisis
//!
//! Runs the application's invariants.
//!
//! - **Cadence**: with `inv_check_period = N > 0`, every invariant runs in the
//!   end-block of each height divisible by `N`. `N = 0` disables the check.
//! - **On demand**: `verify_invariant` lets any account pay `constant_fee` to
//!   run one named invariant.
//!
//! A broken invariant is fatal either way: the returned [`ModuleError`] is
//! flagged `fatal` and the node halts.
//!
//! [`ModuleError`]: shared_types::ModuleError

pub mod keeper;
pub mod module;
pub mod types;

pub use keeper::CrisisKeeper;
pub use module::{CrisisGenesis, CrisisModule, CrisisModuleBasic};
pub use types::{CrisisError, CrisisParams, MsgVerifyInvariant};

/// Module name, store namespace and message route.
pub const MODULE_NAME: &str = "crisis";

pub const STORE_KEY: &str = "crisis";

pub const CODESPACE: &str = "crisis";
