//! # Module Registry - Deterministic Ordering
//!
//! Every iteration over the application's modules goes through this registry.
//! Nothing iterates a hash map: the default order is registration order, and
//! each lifecycle phase may carry an explicit permutation of the module names.
//!
//! ## How It Works
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         ModuleManager                             │
//! │                                                                   │
//! │  default:        auth ─▶ bankx ─▶ supply ─▶ ... ─▶ genutil        │
//! │  begin_block:    distribution ─▶ ...                              │
//! │  end_block:      staking ─▶ crisis ─▶ ...                         │
//! │  init_genesis:   auth ─▶ supply ─▶ bankx ─▶ ... ─▶ genutil        │
//! │  export_genesis: (same as init unless overridden)                 │
//! │                                                                   │
//! │                ┌──────────────┐   ┌──────────────┐                │
//! │   build ─────▶ │  msg router  │   │ query router │                │
//! │                └──────────────┘   └──────────────┘                │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Misconfiguration
//!
//! | Mistake | Outcome |
//! |---------|---------|
//! | Two modules with one name | panic at construction |
//! | Phase order missing / repeating / inventing a name | panic (`try_` variant returns [`RegistryError`]) |
//! | Two modules claiming one msg or querier route | [`RegistryError::DuplicateRoute`] |
//! | Two modules registering one message type | [`RegistryError::Codec`] |

pub mod basic;
pub mod manager;
pub mod router;

pub use basic::BasicManager;
pub use manager::ModuleManager;
pub use router::Router;

use shared_types::CodecError;
use std::fmt;
use thiserror::Error;

/// Lifecycle phases with an overridable module order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeginBlock,
    EndBlock,
    InitGenesis,
    ExportGenesis,
}

impl Phase {
    #[must_use]
    pub fn all() -> [Phase; 4] {
        [
            Self::BeginBlock,
            Self::EndBlock,
            Self::InitGenesis,
            Self::ExportGenesis,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BeginBlock => "begin_block",
            Self::EndBlock => "end_block",
            Self::InitGenesis => "init_genesis",
            Self::ExportGenesis => "export_genesis",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("module '{0}' registered twice")]
    DuplicateModule(String),

    #[error("{phase} order is missing module '{name}'")]
    MissingModule { phase: Phase, name: String },

    #[error("{phase} order names unknown module '{name}'")]
    UnknownModule { phase: Phase, name: String },

    #[error("{phase} order lists module '{name}' twice")]
    DuplicateInOrder { phase: Phase, name: String },

    #[error("{kind} route '{route}' claimed by both {first} and {second}")]
    DuplicateRoute {
        kind: &'static str,
        route: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
