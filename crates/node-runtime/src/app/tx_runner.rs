//! Transaction execution: ante step, then every message through the router.

use crate::registry::Router;
use dx_01_auth::AnteHandler;
use shared_types::{Codec, CodecError, Context, ModuleError, Tx};
use tracing::debug;

/// Runs decoded transactions against a context.
///
/// Shared between DeliverTx and the genesis transaction adapter, so genesis
/// transactions take exactly the same path as live ones.
pub struct TxRunner {
    codec: Codec,
    ante: AnteHandler,
    router: Router,
}

impl TxRunner {
    #[must_use]
    pub fn new(codec: Codec, ante: AnteHandler, router: Router) -> Self {
        Self { codec, ante, router }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Tx, CodecError> {
        self.codec.decode_tx(bytes)
    }

    /// Ante handler, then each message in order. Stops at the first failure;
    /// the caller owns the checkpoint and reverts.
    pub fn run(&self, ctx: &mut Context<'_>, tx: &Tx, tx_len: usize) -> Result<(), ModuleError> {
        self.ante.run(ctx, tx, tx_len)?;

        for (index, msg) in tx.msgs.iter().enumerate() {
            let module = self.router.route(&msg.route).ok_or_else(|| {
                ModuleError::unknown_request(format!("unrecognized message route: {}", msg.route))
            })?;
            debug!(
                index,
                route = %msg.route,
                msg_type = %msg.msg_type,
                "[tx] dispatching message"
            );
            module.handle_msg(ctx, msg)?;
        }
        Ok(())
    }
}
