//! # dx-07-genutil
//!
//! Genesis transactions (`gen_txs`): signed `create_validator` transactions
//! collected from the initial validators and delivered while the genesis is
//! imported, after balances and staking state exist.
//!
//! ```text
//! InitChain ─▶ auth, supply, bank, distribution, staking, crisis ─▶ genutil
//!                                                                    │
//!                             deliver each gen tx ◀──────────────────┤
//!                             apply validator set updates ◀──────────┘
//! ```
//!
//! Delivery goes through the application's transaction runner, which only
//! exists once every module is assembled. The module therefore holds a
//! [`Deferred`] [`GenesisTxDeliverer`].

use serde::{Deserialize, Serialize};
use shared_types::{
    decode_module_genesis, encode_module_genesis, AppModule, AppModuleBasic, Context, Deferred,
    GenesisError, ModuleError, Tx, ValidatorUpdate,
};
use tracing::info;

/// Module name.
pub const MODULE_NAME: &str = "genutil";

/// Applies genesis transactions against the genesis state.
pub trait GenesisTxDeliverer: Send + Sync {
    /// Run `tx` through the full transaction pipeline (ante and handlers).
    fn deliver_gen_tx(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), ModuleError>;

    /// Compute the validator set produced by the delivered transactions.
    fn apply_validator_updates(&self, ctx: &mut Context<'_>) -> Result<Vec<ValidatorUpdate>, ModuleError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenutilGenesis {
    #[serde(default)]
    pub gen_txs: Vec<serde_json::Value>,
}

impl GenutilGenesis {
    /// Decode every genesis transaction, checking it holds exactly one
    /// `create_validator` message.
    pub fn decode_txs(&self) -> Result<Vec<Tx>, String> {
        self.gen_txs
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let tx: Tx = serde_json::from_value(raw.clone())
                    .map_err(|e| format!("gen tx {}: {}", i, e))?;
                match tx.msgs.as_slice() {
                    [msg]
                        if msg.route == dx_04_staking::STORE_KEY
                            && msg.msg_type == dx_04_staking::domain::msgs::TYPE_MSG_CREATE_VALIDATOR =>
                    {
                        Ok(tx)
                    }
                    _ => Err(format!(
                        "gen tx {} must contain exactly one create_validator message",
                        i
                    )),
                }
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GenutilModuleBasic;

impl AppModuleBasic for GenutilModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self) -> serde_json::Value {
        serde_json::to_value(GenutilGenesis::default()).unwrap_or_default()
    }

    fn validate_genesis(&self, genesis: &serde_json::Value) -> Result<(), GenesisError> {
        let state: GenutilGenesis = decode_module_genesis(MODULE_NAME, genesis)?;
        state
            .decode_txs()
            .map(|_| ())
            .map_err(|e| GenesisError::invalid(MODULE_NAME, e))
    }
}

pub struct GenutilModule {
    basic: GenutilModuleBasic,
    deliverer: Deferred<dyn GenesisTxDeliverer>,
}

impl GenutilModule {
    #[must_use]
    pub fn new(deliverer: Deferred<dyn GenesisTxDeliverer>) -> Self {
        Self {
            basic: GenutilModuleBasic,
            deliverer,
        }
    }
}

impl AppModule for GenutilModule {
    fn basic(&self) -> &dyn AppModuleBasic {
        &self.basic
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        genesis: &serde_json::Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: GenutilGenesis = decode_module_genesis(MODULE_NAME, genesis)
            .map_err(|e| ModuleError::internal(e.to_string()))?;
        let txs = state.decode_txs().map_err(ModuleError::internal)?;
        if txs.is_empty() {
            return Ok(Vec::new());
        }

        let deliverer = self.deliverer.get()?;
        for tx in &txs {
            deliverer.deliver_gen_tx(ctx, tx)?;
        }
        info!(gen_txs = txs.len(), "[genutil] genesis transactions delivered");
        deliverer.apply_validator_updates(ctx)
    }

    /// Genesis transactions are consumed on import; the exported state has
    /// none.
    fn export_genesis(&self, _ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
        encode_module_genesis(MODULE_NAME, &GenutilGenesis::default())
    }
}
