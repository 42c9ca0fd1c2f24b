use crate::genesis::{export_genesis, init_genesis, DistrGenesis};
use crate::invariants::register_invariants;
use crate::keeper::DistrKeeper;
use crate::{DISTRIBUTION_ACCOUNT, MODULE_NAME, STORE_KEY};
use shared_types::{
    decode_module_genesis, encode_module_genesis, Address, AppModule, AppModuleBasic, CodeType,
    Command, Context, GenesisError, InvariantRegistry, ModuleError, RequestBeginBlock, RestRoutes,
    ValidatorUpdate,
};
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy)]
pub struct DistrModuleBasic;

impl AppModuleBasic for DistrModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(DistrGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        let state: DistrGenesis = decode_module_genesis(MODULE_NAME, genesis)?;
        state
            .validate()
            .map_err(|e| GenesisError::invalid(MODULE_NAME, e))
    }

    fn register_rest_routes(&self, routes: &mut RestRoutes) {
        routes.add(MODULE_NAME, "/distribution/community_pool");
        routes.add(MODULE_NAME, "/distribution/validators/{validatorAddr}/outstanding_rewards");
    }

    fn query_command(&self) -> Option<Command> {
        Some(
            Command::new("distribution", "Querying commands for the distribution module")
                .owned_by(MODULE_NAME)
                .with_subcommand(
                    Command::new("community-pool", "Query the community pool").owned_by(MODULE_NAME),
                ),
        )
    }

    fn module_accounts(&self) -> &'static [&'static str] {
        &[DISTRIBUTION_ACCOUNT]
    }
}

pub struct DistrModule {
    basic: DistrModuleBasic,
    keeper: Arc<DistrKeeper>,
}

impl DistrModule {
    #[must_use]
    pub fn new(keeper: Arc<DistrKeeper>) -> Self {
        Self {
            basic: DistrModuleBasic,
            keeper,
        }
    }
}

impl AppModule for DistrModule {
    fn basic(&self) -> &dyn AppModuleBasic {
        &self.basic
    }

    fn querier_route(&self) -> Option<&'static str> {
        Some(STORE_KEY)
    }

    fn query(&self, ctx: &Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, ModuleError> {
        match path {
            ["params"] => Ok(serde_json::to_vec(&self.keeper.params(ctx)?)?),
            ["community_pool"] => Ok(serde_json::to_vec(&self.keeper.fee_pool(ctx)?)?),
            ["outstanding_rewards", addr] => {
                let addr = Address::from_hex(addr)
                    .map_err(|e| ModuleError::root(CodeType::InvalidAddress, e.to_string()))?;
                let rewards = self.keeper.outstanding_rewards(ctx, &addr)?;
                Ok(serde_json::to_vec(&rewards.to_string())?)
            }
            _ => Err(ModuleError::unknown_request(format!(
                "unknown distribution query endpoint: {}",
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
        let state: DistrGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        init_genesis(&self.keeper, ctx, &state)?;
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(MODULE_NAME, &export_genesis(&self.keeper, ctx)?)
    }

    fn begin_block(&self, ctx: &mut Context<'_>, _req: &RequestBeginBlock) -> Result<(), ModuleError> {
        self.keeper.allocate_tokens(ctx)
    }
}
