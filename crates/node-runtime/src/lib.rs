//! # Node Runtime Library
//!
//! The Dex-Chain application: module registry, composition root and
//! lifecycle orchestrator. The `main.rs` binary runs it with a development
//! block loop.
//!
//! ## Layout
//!
//! - `registry/` - ordered module collections, phase orders, route tables
//! - `container/` - composition root and configuration
//! - `adapters/` - implementations of the ports module crates declare
//! - `app/` - lifecycle orchestrator and transaction runner

#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod app;
pub mod container;
pub mod errors;
pub mod registry;

pub use app::{DexApp, ExportedApp, LifecycleState, TxRunner};
pub use container::{AppConfig, AppContainer};
pub use errors::AppError;
pub use registry::{BasicManager, ModuleManager, Phase, RegistryError, Router};
