//! Orchestrator errors.

use crate::app::LifecycleState;
use crate::registry::RegistryError;
use dx_03_supply::SupplyError;
use shared_bus::PipelineError;
use shared_store::StoreError;
use shared_types::{DeferredError, GenesisError, ModuleError, ValidatorUpdate};
use thiserror::Error;

/// Failures of the lifecycle calls and of application assembly.
///
/// Transaction failures are not errors at this level: they come back as a
/// non-zero code in the `ResponseDeliverTx`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{call} is not allowed in state {state}")]
    InvalidState {
        call: &'static str,
        state: LifecycleState,
    },

    #[error("block {got} does not follow the last committed height {last}")]
    NonSequentialHeight { last: u64, got: u64 },

    #[error("end block for height {got} while block {open} is open")]
    HeightMismatch { open: u64, got: u64 },

    #[error("chain id '{got}' does not match '{expected}'")]
    ChainIdMismatch { expected: String, got: String },

    #[error("failed to decode app state: {0}")]
    AppStateDecode(String),

    #[error(transparent)]
    Genesis(#[from] GenesisError),

    #[error("genesis validator set mismatch: consensus sent {expected:?}, app produced {produced:?}")]
    ValidatorMismatch {
        expected: Vec<ValidatorUpdate>,
        produced: Vec<ValidatorUpdate>,
    },

    #[error("application halted: {0}")]
    Halted(String),

    #[error("no committed state")]
    NoCommittedState,

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Deferred(#[from] DeferredError),

    #[error("module account permissions: {0}")]
    Permissions(#[from] SupplyError),
}
