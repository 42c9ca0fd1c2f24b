//! Message handler for the `staking` route.

use crate::domain::msgs::{TYPE_MSG_CREATE_VALIDATOR, TYPE_MSG_DELEGATE};
use crate::domain::{MsgCreateValidator, MsgDelegate};
use crate::keeper::StakingKeeper;
use shared_types::{Context, ModuleError, Msg};

pub fn handle_msg(keeper: &StakingKeeper, ctx: &mut Context<'_>, msg: &Msg) -> Result<(), ModuleError> {
    match msg.msg_type.as_str() {
        TYPE_MSG_CREATE_VALIDATOR => {
            let create: MsgCreateValidator = msg.decode()?;
            ctx.require_signer(&create.operator)?;
            keeper.create_validator(
                ctx,
                &create.operator,
                &create.pub_key,
                &create.moniker,
                create.self_delegation,
            )
        }
        TYPE_MSG_DELEGATE => {
            let delegate: MsgDelegate = msg.decode()?;
            ctx.require_signer(&delegate.delegator)?;
            keeper.delegate(ctx, &delegate.delegator, &delegate.validator, delegate.amount)
        }
        other => Err(ModuleError::unknown_request(format!(
            "unrecognized staking message type: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::{ctx, fund, min_self, setup};
    use crate::STORE_KEY;
    use shared_types::Address;

    #[test]
    fn test_create_validator_message() {
        let (keeper, mut cache) = setup();
        let op = Address::new([1; 20]);
        let msg = Msg::new(
            STORE_KEY,
            TYPE_MSG_CREATE_VALIDATOR,
            &MsgCreateValidator {
                operator: op,
                pub_key: "abcd".into(),
                moniker: "node0".into(),
                self_delegation: min_self(),
            },
        )
        .unwrap();

        let mut ctx = ctx(&mut cache).with_signer(op);
        fund(&keeper, &mut ctx, &op, min_self());
        handle_msg(&keeper, &mut ctx, &msg).unwrap();

        let validator = keeper.validator(&ctx, &op).unwrap().unwrap();
        assert_eq!(validator.moniker, "node0");
        assert_eq!(keeper.validator_by_pub_key(&ctx, "abcd").unwrap(), Some(op));
    }
}
