use crate::genesis::{export_genesis, init_genesis, SupplyGenesis};
use crate::invariants::register_invariants;
use crate::keeper::SupplyKeeper;
use crate::{MODULE_NAME, QUERIER_ROUTE};
use shared_types::{
    decode_module_genesis, encode_module_genesis, AppModule, AppModuleBasic, Command, Context,
    GenesisError, InvariantRegistry, ModuleError, RestRoutes, ValidatorUpdate,
};
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy)]
pub struct SupplyModuleBasic;

impl AppModuleBasic for SupplyModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(SupplyGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        decode_module_genesis::<SupplyGenesis>(MODULE_NAME, genesis).map(|_| ())
    }

    fn register_rest_routes(&self, routes: &mut RestRoutes) {
        routes.add(MODULE_NAME, "/supply/total");
    }

    fn query_command(&self) -> Option<Command> {
        Some(Command::new("total-supply", "Query the total supply of coins").owned_by(MODULE_NAME))
    }
}

pub struct SupplyModule {
    basic: SupplyModuleBasic,
    keeper: Arc<SupplyKeeper>,
}

impl SupplyModule {
    #[must_use]
    pub fn new(keeper: Arc<SupplyKeeper>) -> Self {
        Self {
            basic: SupplyModuleBasic,
            keeper,
        }
    }
}

impl AppModule for SupplyModule {
    fn basic(&self) -> &dyn AppModuleBasic {
        &self.basic
    }

    fn querier_route(&self) -> Option<&'static str> {
        Some(QUERIER_ROUTE)
    }

    fn query(&self, ctx: &Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, ModuleError> {
        match path {
            ["total"] => Ok(serde_json::to_vec(&export_genesis(&self.keeper, ctx)?)?),
            _ => Err(ModuleError::unknown_request(format!(
                "unknown supply query endpoint: {}",
                path.join("/")
            ))),
        }
    }

    fn register_invariants(&self, registry: &mut InvariantRegistry) {
        register_invariants(registry, Arc::clone(&self.keeper));
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        genesis: &serde_json::Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: SupplyGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        init_genesis(&self.keeper, ctx, &state)?;
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(MODULE_NAME, &export_genesis(&self.keeper, ctx)?)
    }
}
