use crate::domain::msgs::{TYPE_MSG_CREATE_VALIDATOR, TYPE_MSG_DELEGATE};
use crate::genesis::{export_genesis, init_genesis, StakingGenesis};
use crate::handler::handle_msg;
use crate::invariants::register_invariants;
use crate::keeper::StakingKeeper;
use crate::{BONDED_POOL, EVENT_CREATE_VALIDATOR, MODULE_NAME, NOT_BONDED_POOL, STORE_KEY};
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{
    decode_module_genesis, encode_module_genesis, Address, Amount, AppModule, AppModuleBasic,
    CodeType, Codec, CodecError, Command, Context, GenesisError, InvariantRegistry, ModuleError,
    Msg, RequestEndBlock, RestRoutes, ValidatorUpdate,
};
use std::sync::Arc;

#[serde_as]
#[derive(Serialize)]
struct Pool {
    #[serde_as(as = "DisplayFromStr")]
    bonded_tokens: Amount,
    #[serde_as(as = "DisplayFromStr")]
    not_bonded_tokens: Amount,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StakingModuleBasic;

impl AppModuleBasic for StakingModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn register_codec(&self, codec: &mut Codec) -> Result<(), CodecError> {
        codec.register_msg(MODULE_NAME, STORE_KEY, TYPE_MSG_CREATE_VALIDATOR)?;
        codec.register_msg(MODULE_NAME, STORE_KEY, TYPE_MSG_DELEGATE)
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(StakingGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        let state: StakingGenesis = decode_module_genesis(MODULE_NAME, genesis)?;
        state
            .validate()
            .map_err(|e| GenesisError::invalid(MODULE_NAME, e))
    }

    fn register_rest_routes(&self, routes: &mut RestRoutes) {
        routes.add(MODULE_NAME, "/staking/validators");
        routes.add(MODULE_NAME, "/staking/validators/{validatorAddr}");
        routes.add(MODULE_NAME, "/staking/pool");
        routes.add(MODULE_NAME, "/staking/parameters");
    }

    fn tx_command(&self) -> Option<Command> {
        Some(
            Command::new("staking", "Staking transaction subcommands")
                .owned_by(MODULE_NAME)
                .with_subcommand(
                    Command::new("create-validator", "Create a new validator").owned_by(MODULE_NAME),
                )
                .with_subcommand(
                    Command::new("delegate", "Delegate tokens to a validator").owned_by(MODULE_NAME),
                ),
        )
    }

    fn query_command(&self) -> Option<Command> {
        Some(
            Command::new("staking", "Querying commands for the staking module")
                .owned_by(MODULE_NAME)
                .with_subcommand(Command::new("validators", "Query all validators").owned_by(MODULE_NAME))
                .with_subcommand(Command::new("pool", "Query the bonding pools").owned_by(MODULE_NAME)),
        )
    }

    fn module_accounts(&self) -> &'static [&'static str] {
        &[BONDED_POOL, NOT_BONDED_POOL]
    }

    fn publishable_events(&self) -> &'static [&'static str] {
        &[EVENT_CREATE_VALIDATOR]
    }
}

pub struct StakingModule {
    basic: StakingModuleBasic,
    keeper: Arc<StakingKeeper>,
}

impl StakingModule {
    #[must_use]
    pub fn new(keeper: Arc<StakingKeeper>) -> Self {
        Self {
            basic: StakingModuleBasic,
            keeper,
        }
    }
}

impl AppModule for StakingModule {
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
            ["validators"] => Ok(serde_json::to_vec(&self.keeper.validators(ctx)?)?),
            ["validator", addr] => {
                let addr = Address::from_hex(addr)
                    .map_err(|e| ModuleError::root(CodeType::InvalidAddress, e.to_string()))?;
                let validator = self
                    .keeper
                    .validator(ctx, &addr)?
                    .ok_or(crate::StakingError::UnknownValidator(addr))?;
                Ok(serde_json::to_vec(&validator)?)
            }
            ["params"] => Ok(serde_json::to_vec(&self.keeper.params(ctx)?)?),
            ["pool"] => {
                let supply = self.keeper.supply();
                Ok(serde_json::to_vec(&Pool {
                    bonded_tokens: supply.module_balance(ctx, BONDED_POOL)?,
                    not_bonded_tokens: supply.module_balance(ctx, NOT_BONDED_POOL)?,
                })?)
            }
            _ => Err(ModuleError::unknown_request(format!(
                "unknown staking query endpoint: {}",
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
        let state: StakingGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        init_genesis(&self.keeper, ctx, &state)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(MODULE_NAME, &export_genesis(&self.keeper, ctx)?)
    }

    fn end_block(
        &self,
        ctx: &mut Context<'_>,
        _req: &RequestEndBlock,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        self.keeper.apply_and_return_validator_set_updates(ctx)
    }
}
