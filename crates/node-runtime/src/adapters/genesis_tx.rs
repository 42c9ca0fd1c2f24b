//! Delivers genesis transactions through the live transaction path.

use crate::app::TxRunner;
use dx_04_staking::StakingKeeper;
use dx_07_genutil::GenesisTxDeliverer;
use shared_types::{Context, ModuleError, Tx, ValidatorUpdate};
use std::sync::Arc;
use tracing::debug;

pub struct GenesisTxAdapter {
    runner: Arc<TxRunner>,
    staking: Arc<StakingKeeper>,
}

impl GenesisTxAdapter {
    #[must_use]
    pub fn new(runner: Arc<TxRunner>, staking: Arc<StakingKeeper>) -> Self {
        Self { runner, staking }
    }
}

impl GenesisTxDeliverer for GenesisTxAdapter {
    fn deliver_gen_tx(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), ModuleError> {
        let runner = &self.runner;
        for msg in &tx.msgs {
            if !runner.codec().is_registered(&msg.route, &msg.msg_type) {
                return Err(ModuleError::unknown_request(format!(
                    "unregistered message type {}/{}",
                    msg.route, msg.msg_type
                )));
            }
        }
        let tx_len = runner
            .codec()
            .encode_tx(tx)
            .map_err(|e| ModuleError::internal(e.to_string()))?
            .len();

        let previous = ctx.set_signer(Some(tx.signer));
        let result = runner.run(ctx, tx, tx_len);
        ctx.set_signer(previous);

        debug!(signer = %tx.signer, ok = result.is_ok(), "[genesis] gen tx delivered");
        result
    }

    fn apply_validator_updates(&self, ctx: &mut Context<'_>) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        self.staking.apply_and_return_validator_set_updates(ctx)
    }
}
