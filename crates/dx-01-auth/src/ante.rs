//! # Ante Handler
//!
//! Runs before the messages of every transaction, inside the transaction's
//! checkpoint: a rejection here reverts together with the transaction.
//!
//! ## Checks (in order)
//!
//! 1. At least one message
//! 2. Memo length within `max_memo_characters`
//! 3. Size gas: `tx_size_cost_per_byte * len(tx_bytes)`
//! 4. Signer account exists and the sequence matches
//! 5. Fee moved to the fee collector
//! 6. Signer sequence incremented

use crate::domain::AuthError;
use crate::keeper::AccountKeeper;
use crate::ports::FeeCollector;
use shared_types::{Context, ModuleError, Tx};
use std::sync::Arc;
use tracing::debug;

pub struct AnteHandler {
    accounts: Arc<AccountKeeper>,
    fees: Arc<dyn FeeCollector>,
}

impl AnteHandler {
    #[must_use]
    pub fn new(accounts: Arc<AccountKeeper>, fees: Arc<dyn FeeCollector>) -> Self {
        Self { accounts, fees }
    }

    pub fn run(&self, ctx: &mut Context<'_>, tx: &Tx, tx_len: usize) -> Result<(), ModuleError> {
        self.check(ctx, tx, tx_len).inspect_err(|e| {
            debug!(signer = %tx.signer, code = e.code, reason = %e.message, "[auth] ante rejected tx");
        })
    }

    fn check(&self, ctx: &mut Context<'_>, tx: &Tx, tx_len: usize) -> Result<(), ModuleError> {
        if tx.msgs.is_empty() {
            return Err(AuthError::NoMessages.into());
        }

        let params = self.accounts.params(ctx)?;
        let memo_len = tx.memo.chars().count();
        if memo_len as u64 > params.max_memo_characters {
            return Err(AuthError::MemoTooLarge {
                len: memo_len,
                max: params.max_memo_characters,
            }
            .into());
        }

        ctx.consume_gas(
            params.tx_size_cost_per_byte.saturating_mul(tx_len as u64),
            "txSize",
        )?;

        let account = self
            .accounts
            .get_account(ctx, &tx.signer)?
            .ok_or(AuthError::UnknownAccount(tx.signer))?;
        if account.sequence != tx.sequence {
            return Err(AuthError::InvalidSequence {
                expected: account.sequence,
                got: tx.sequence,
            }
            .into());
        }

        if tx.fee > 0 {
            self.fees.collect_fee(ctx, &tx.signer, tx.fee)?;
            debug!(signer = %tx.signer, fee = %tx.fee, "[auth] fee deducted");
        }

        self.accounts.increment_sequence(ctx, &tx.signer)?;
        debug!(signer = %tx.signer, sequence = tx.sequence + 1, "[auth] sequence bumped");
        Ok(())
    }
}
