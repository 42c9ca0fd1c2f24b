//! Message handler for the `bankx` route.

use crate::domain::msgs::TYPE_MSG_SEND;
use crate::domain::MsgSend;
use crate::keeper::BankKeeper;
use shared_types::{Context, ModuleError, Msg};

pub fn handle_msg(keeper: &BankKeeper, ctx: &mut Context<'_>, msg: &Msg) -> Result<(), ModuleError> {
    match msg.msg_type.as_str() {
        TYPE_MSG_SEND => {
            let send: MsgSend = msg.decode()?;
            ctx.require_signer(&send.from_address)?;
            keeper.send_coins(ctx, &send.from_address, &send.to_address, send.amount)?;
            Ok(())
        }
        other => Err(ModuleError::unknown_request(format!(
            "unrecognized bankx message type: {}",
            other
        ))),
    }
}
