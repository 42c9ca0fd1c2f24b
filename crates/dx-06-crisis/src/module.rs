use crate::keeper::CrisisKeeper;
use crate::types::{CrisisParams, MsgVerifyInvariant, TYPE_MSG_VERIFY_INVARIANT};
use crate::{MODULE_NAME, STORE_KEY};
use serde::{Deserialize, Serialize};
use shared_types::{
    decode_module_genesis, encode_module_genesis, AppModule, AppModuleBasic, Codec, CodecError,
    Command, Context, GenesisError, ModuleError, Msg, RequestEndBlock, ValidatorUpdate,
};
use std::sync::Arc;

/// Crisis genesis state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisGenesis {
    pub params: CrisisParams,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CrisisModuleBasic;

impl AppModuleBasic for CrisisModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn register_codec(&self, codec: &mut Codec) -> Result<(), CodecError> {
        codec.register_msg(MODULE_NAME, STORE_KEY, TYPE_MSG_VERIFY_INVARIANT)
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(CrisisGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        let state: CrisisGenesis = decode_module_genesis(MODULE_NAME, genesis)?;
        state
            .params
            .validate()
            .map_err(|e| GenesisError::invalid(MODULE_NAME, e))
    }

    fn tx_command(&self) -> Option<Command> {
        Some(
            Command::new("crisis", "Crisis transactions subcommands")
                .owned_by(MODULE_NAME)
                .with_subcommand(
                    Command::new("invariant-broken", "Submit proof that an invariant broken to halt the chain")
                        .owned_by(MODULE_NAME),
                ),
        )
    }
}

pub struct CrisisModule {
    basic: CrisisModuleBasic,
    keeper: Arc<CrisisKeeper>,
}

impl CrisisModule {
    #[must_use]
    pub fn new(keeper: Arc<CrisisKeeper>) -> Self {
        Self {
            basic: CrisisModuleBasic,
            keeper,
        }
    }
}

impl AppModule for CrisisModule {
    fn basic(&self) -> &dyn AppModuleBasic {
        &self.basic
    }

    fn route(&self) -> Option<&'static str> {
        Some(STORE_KEY)
    }

    fn handle_msg(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<(), ModuleError> {
        match msg.msg_type.as_str() {
            TYPE_MSG_VERIFY_INVARIANT => {
                let verify: MsgVerifyInvariant = msg.decode()?;
                ctx.require_signer(&verify.sender)?;
                self.keeper.verify_invariant(
                    ctx,
                    &verify.sender,
                    &verify.invariant_module_name,
                    &verify.invariant_route,
                )
            }
            other => Err(ModuleError::unknown_request(format!(
                "unrecognized crisis message type: {}",
                other
            ))),
        }
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        genesis: &serde_json::Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: CrisisGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        self.keeper.set_params(ctx, &state.params)?;
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(
            MODULE_NAME,
            &CrisisGenesis {
                params: self.keeper.params(ctx)?,
            },
        )
    }

    fn end_block(
        &self,
        ctx: &mut Context<'_>,
        req: &RequestEndBlock,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        if self.keeper.should_check(req.height) {
            self.keeper.assert_invariants(ctx)?;
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::{ctx, setup};
    use shared_types::InvariantRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_end_block_runs_invariants_on_cadence() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);
        let mut registry = InvariantRegistry::new();
        registry.register("test", "count", |_| {
            RUNS.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        });
        let (keeper, mut cache) = setup(registry, 3);
        let module = CrisisModule::new(Arc::new(keeper));

        for height in 1..=7 {
            let mut ctx = ctx(&mut cache, height);
            module
                .end_block(&mut ctx, &RequestEndBlock { height })
                .unwrap();
        }
        assert_eq!(RUNS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_fee_genesis_is_invalid() {
        let basic = CrisisModuleBasic;
        let bad = serde_json::json!({"params": {"constant_fee": "0"}});
        assert!(basic.validate_genesis(&bad).is_err());
        assert!(basic.validate_genesis(&basic.default_genesis()).is_ok());
    }
}
