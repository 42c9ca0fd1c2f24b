//! # Shared Types Crate
//!
//! Types shared by every module crate and the node runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: entities, lifecycle messages, the execution
//!   context and the module traits are defined here and nowhere else.
//! - **No module knows the app**: module crates depend on this crate and on
//!   the crates they genuinely call, never on the runtime that assembles them.
//! - **Deterministic encodings**: JSON for genesis and transactions (ordered
//!   maps, decimal-string amounts), bincode for stored values.

pub mod context;
pub mod deferred;
pub mod entities;
pub mod errors;
pub mod events;
pub mod genesis;
pub mod invariants;
pub mod lifecycle;
pub mod module_trait;
pub mod tx;

pub use context::Context;
pub use deferred::Deferred;
pub use entities::*;
pub use errors::*;
pub use events::{AllowList, Attribute, Event, EventManager};
pub use genesis::{decode_module_genesis, encode_module_genesis, AppState};
pub use invariants::{Invariant, InvariantRegistry, InvariantViolation};
pub use lifecycle::*;
pub use module_trait::{AppModule, AppModuleBasic, Command, RestRoute, RestRoutes};
pub use tx::{Codec, CodecError, Msg, Tx};

pub use shared_store::{StateDigest, StoreKey};
