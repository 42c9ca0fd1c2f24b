use crate::domain::msgs::TYPE_MSG_SEND;
use crate::genesis::{export_genesis, init_genesis, BankGenesis};
use crate::handler::handle_msg;
use crate::keeper::BankKeeper;
use crate::{EVENT_SEND_COINS, MODULE_NAME, STORE_KEY};
use shared_types::{
    decode_module_genesis, encode_module_genesis, AppModule, AppModuleBasic, Codec, CodecError,
    Command, Context, GenesisError, ModuleError, Msg, RestRoutes, ValidatorUpdate,
};
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy)]
pub struct BankModuleBasic;

impl AppModuleBasic for BankModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn register_codec(&self, codec: &mut Codec) -> Result<(), CodecError> {
        codec.register_msg(MODULE_NAME, STORE_KEY, TYPE_MSG_SEND)
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(BankGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        let state: BankGenesis = decode_module_genesis(MODULE_NAME, genesis)?;
        state
            .validate()
            .map_err(|e| GenesisError::invalid(MODULE_NAME, e.to_string()))
    }

    fn register_rest_routes(&self, routes: &mut RestRoutes) {
        // Usually already claimed by auth.
        routes.add(MODULE_NAME, "/bank/balances/{address}");
        routes.add(MODULE_NAME, "/bank/accounts/{address}/transfers");
    }

    fn tx_command(&self) -> Option<Command> {
        Some(Command::new("send", "Create and sign a send tx").owned_by(MODULE_NAME))
    }

    fn query_command(&self) -> Option<Command> {
        Some(Command::new("bankx-params", "Query bankx params").owned_by(MODULE_NAME))
    }

    fn publishable_events(&self) -> &'static [&'static str] {
        &[EVENT_SEND_COINS]
    }
}

pub struct BankModule {
    basic: BankModuleBasic,
    keeper: Arc<BankKeeper>,
}

impl BankModule {
    #[must_use]
    pub fn new(keeper: Arc<BankKeeper>) -> Self {
        Self {
            basic: BankModuleBasic,
            keeper,
        }
    }
}

impl AppModule for BankModule {
    fn basic(&self) -> &dyn AppModuleBasic {
        &self.basic
    }

    fn route(&self) -> Option<&'static str> {
        Some(STORE_KEY)
    }

    fn handle_msg(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<(), ModuleError> {
        handle_msg(&self.keeper, ctx, msg)
    }

    fn querier_route(&self) -> Option<&'static str> {
        Some(STORE_KEY)
    }

    fn query(&self, ctx: &Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, ModuleError> {
        match path {
            ["params"] => Ok(serde_json::to_vec(&self.keeper.params(ctx)?)?),
            _ => Err(ModuleError::unknown_request(format!(
                "unknown bankx query endpoint: {}",
                path.join("/")
            ))),
        }
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        genesis: &serde_json::Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: BankGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        init_genesis(&self.keeper, ctx, &state)?;
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(MODULE_NAME, &export_genesis(&self.keeper, ctx)?)
    }
}
