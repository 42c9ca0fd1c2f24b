//! # Module Contracts
//!
//! Every application module implements two traits:
//!
//! - [`AppModuleBasic`] - stateless capabilities available before any keeper
//!   exists: codec registration, default/validated genesis, REST routes and
//!   CLI commands.
//! - [`AppModule`] - the stateful module built around its keeper: message
//!   routing, queries, invariants, genesis import/export and block hooks.
//!
//! ```text
//! ┌──────────────────────┐      basic()      ┌──────────────────────┐
//! │ AppModule (keeper)   │ ────────────────▶ │ AppModuleBasic       │
//! │ handle_msg / query   │                   │ codec / genesis json │
//! │ begin/end block      │                   │ routes / commands    │
//! └──────────────────────┘                   └──────────────────────┘
//! ```

use crate::context::Context;
use crate::entities::ValidatorUpdate;
use crate::errors::{GenesisError, ModuleError};
use crate::invariants::InvariantRegistry;
use crate::lifecycle::{RequestBeginBlock, RequestEndBlock};
use crate::tx::{Codec, CodecError, Msg};
use tracing::debug;

/// Stateless half of a module.
pub trait AppModuleBasic: Send + Sync {
    /// Unique module name; also the key of its genesis blob.
    fn name(&self) -> &'static str;

    fn register_codec(&self, _codec: &mut Codec) -> Result<(), CodecError> {
        Ok(())
    }

    fn default_genesis(&self) -> serde_json::Value;

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError>;

    fn register_rest_routes(&self, _routes: &mut RestRoutes) {}

    fn tx_command(&self) -> Option<Command> {
        None
    }

    fn query_command(&self) -> Option<Command> {
        None
    }

    /// Module accounts this module owns.
    fn module_accounts(&self) -> &'static [&'static str] {
        &[]
    }

    /// Event kinds this module wants routed to the external publisher.
    fn publishable_events(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Stateful half of a module.
pub trait AppModule: Send + Sync {
    fn basic(&self) -> &dyn AppModuleBasic;

    fn name(&self) -> &'static str {
        self.basic().name()
    }

    /// Message route handled by this module.
    fn route(&self) -> Option<&'static str> {
        None
    }

    fn handle_msg(&self, _ctx: &mut Context<'_>, msg: &Msg) -> Result<(), ModuleError> {
        Err(ModuleError::unknown_request(format!(
            "unrecognized {} message type: {}",
            self.name(),
            msg.msg_type
        )))
    }

    fn querier_route(&self) -> Option<&'static str> {
        None
    }

    fn query(&self, _ctx: &Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, ModuleError> {
        Err(ModuleError::unknown_request(format!(
            "unknown {} query endpoint: {}",
            self.name(),
            path.join("/")
        )))
    }

    fn register_invariants(&self, _registry: &mut InvariantRegistry) {}

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        genesis: &serde_json::Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError>;

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError>;

    fn begin_block(&self, _ctx: &mut Context<'_>, _req: &RequestBeginBlock) -> Result<(), ModuleError> {
        Ok(())
    }

    fn end_block(
        &self,
        _ctx: &mut Context<'_>,
        _req: &RequestEndBlock,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        Ok(Vec::new())
    }
}

// =============================================================================
// REST ROUTES
// =============================================================================

/// A REST path and the module that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRoute {
    pub path: String,
    pub module: &'static str,
}

/// REST route table. The first module to claim a path keeps it; modules
/// registered earlier therefore take precedence.
#[derive(Debug, Clone, Default)]
pub struct RestRoutes {
    routes: Vec<RestRoute>,
}

impl RestRoutes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` for `module`. Returns false if the path was already taken.
    pub fn add(&mut self, module: &'static str, path: impl Into<String>) -> bool {
        let path = path.into();
        if let Some(existing) = self.resolve(&path) {
            debug!(
                "[routes] {} already served by {}, ignoring {}",
                path, existing, module
            );
            return false;
        }
        self.routes.push(RestRoute { path, module });
        true
    }

    pub fn resolve(&self, path: &str) -> Option<&'static str> {
        self.routes
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.module)
    }

    pub fn routes(&self) -> &[RestRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// =============================================================================
// CLI COMMANDS
// =============================================================================

/// Node of the CLI command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub about: String,
    pub module: Option<&'static str>,
    pub subcommands: Vec<Command>,
}

impl Command {
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            module: None,
            subcommands: Vec::new(),
        }
    }

    #[must_use]
    pub fn owned_by(mut self, module: &'static str) -> Self {
        self.module = Some(module);
        self
    }

    #[must_use]
    pub fn with_subcommand(mut self, command: Command) -> Self {
        self.add_subcommand(command);
        self
    }

    /// Attach `command`. An existing subcommand with the same name wins.
    pub fn add_subcommand(&mut self, command: Command) -> bool {
        if self.find(&command.name).is_some() {
            debug!(
                "[commands] '{} {}' already registered, ignoring duplicate",
                self.name, command.name
            );
            return false;
        }
        self.subcommands.push(command);
        true
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.name == name)
    }

    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|c| c.name.as_str()).collect()
    }
}
