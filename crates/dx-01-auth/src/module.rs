//! Auth module wiring.

use crate::genesis::{export_genesis, init_genesis, AuthGenesis};
use crate::keeper::AccountKeeper;
use crate::{FEE_COLLECTOR, MODULE_NAME, QUERIER_ROUTE};
use shared_types::{
    decode_module_genesis, encode_module_genesis, Address, AppModule, AppModuleBasic, Command,
    Context, GenesisError, ModuleError, RestRoutes, ValidatorUpdate,
};
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy)]
pub struct AuthModuleBasic;

impl AppModuleBasic for AuthModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(AuthGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        let state: AuthGenesis = decode_module_genesis(MODULE_NAME, genesis)?;
        state
            .validate()
            .map_err(|e| GenesisError::invalid(MODULE_NAME, e))
    }

    fn register_rest_routes(&self, routes: &mut RestRoutes) {
        routes.add(MODULE_NAME, "/auth/accounts/{address}");
        routes.add(MODULE_NAME, "/bank/balances/{address}");
    }

    fn query_command(&self) -> Option<Command> {
        Some(
            Command::new("account", "Query account balance, number and sequence")
                .owned_by(MODULE_NAME),
        )
    }

    fn module_accounts(&self) -> &'static [&'static str] {
        &[FEE_COLLECTOR]
    }
}

pub struct AuthModule {
    basic: AuthModuleBasic,
    keeper: Arc<AccountKeeper>,
}

impl AuthModule {
    #[must_use]
    pub fn new(keeper: Arc<AccountKeeper>) -> Self {
        Self {
            basic: AuthModuleBasic,
            keeper,
        }
    }
}

impl AppModule for AuthModule {
    fn basic(&self) -> &dyn AppModuleBasic {
        &self.basic
    }

    fn querier_route(&self) -> Option<&'static str> {
        Some(QUERIER_ROUTE)
    }

    fn query(&self, ctx: &Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, ModuleError> {
        match path {
            ["account", addr] => {
                let addr = Address::from_hex(addr)
                    .map_err(|e| ModuleError::root(shared_types::CodeType::InvalidAddress, e.to_string()))?;
                let account = self
                    .keeper
                    .get_account(ctx, &addr)?
                    .ok_or(crate::AuthError::UnknownAccount(addr))?;
                Ok(serde_json::to_vec(&account)?)
            }
            ["params"] => Ok(serde_json::to_vec(&self.keeper.params(ctx)?)?),
            _ => Err(ModuleError::unknown_request(format!(
                "unknown auth query endpoint: {}",
                path.join("/")
            ))),
        }
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        genesis: &serde_json::Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: AuthGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        init_genesis(&self.keeper, ctx, &state)?;
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(MODULE_NAME, &export_genesis(&self.keeper, ctx)?)
    }
}
