//! Stateless module operations, in registration order.

use super::RegistryError;
use shared_types::{AppModuleBasic, AppState, Codec, Command, GenesisError, RestRoutes};
use std::collections::BTreeSet;
use tracing::debug;

/// Ordered collection of [`AppModuleBasic`]s.
pub struct BasicManager {
    basics: Vec<Box<dyn AppModuleBasic>>,
}

impl BasicManager {
    /// # Panics
    ///
    /// Panics if two basics share a name.
    #[must_use]
    pub fn new(basics: Vec<Box<dyn AppModuleBasic>>) -> Self {
        match Self::try_new(basics) {
            Ok(manager) => manager,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(basics: Vec<Box<dyn AppModuleBasic>>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for basic in &basics {
            if !seen.insert(basic.name()) {
                return Err(RegistryError::DuplicateModule(basic.name().to_string()));
            }
        }
        Ok(Self { basics })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.basics.iter().map(|b| b.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn AppModuleBasic> {
        self.basics.iter().map(|b| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.basics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basics.is_empty()
    }

    pub fn register_codec(&self, codec: &mut Codec) -> Result<(), RegistryError> {
        for basic in &self.basics {
            basic.register_codec(codec)?;
        }
        debug!(messages = codec.len(), "[registry] codec registered");
        Ok(())
    }

    /// Default genesis of every module.
    pub fn default_genesis(&self) -> AppState {
        let mut state = AppState::new();
        for basic in &self.basics {
            state.insert(basic.name(), basic.default_genesis());
        }
        state
    }

    /// Validate every module blob present in `state`. Modules without a blob
    /// are skipped. The first failure aborts.
    pub fn validate_genesis(&self, state: &AppState) -> Result<(), GenesisError> {
        for basic in &self.basics {
            if let Some(genesis) = state.get(basic.name()) {
                basic.validate_genesis(genesis)?;
            }
        }
        Ok(())
    }

    pub fn register_rest_routes(&self, routes: &mut RestRoutes) {
        for basic in &self.basics {
            basic.register_rest_routes(routes);
        }
    }

    /// Attach every module's tx command under `root`. The first module to
    /// claim a command name keeps it.
    pub fn add_tx_commands(&self, root: &mut Command) {
        for command in self.basics.iter().filter_map(|b| b.tx_command()) {
            root.add_subcommand(command);
        }
    }

    pub fn add_query_commands(&self, root: &mut Command) {
        for command in self.basics.iter().filter_map(|b| b.query_command()) {
            root.add_subcommand(command);
        }
    }

    /// Module accounts declared by all modules.
    pub fn module_accounts(&self) -> BTreeSet<&'static str> {
        self.basics
            .iter()
            .flat_map(|b| b.module_accounts().iter().copied())
            .collect()
    }

    /// Union of the publishable event kinds, in registration order.
    pub fn publishable_events(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = Vec::new();
        for kind in self.basics.iter().flat_map(|b| b.publishable_events().iter().copied()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}
