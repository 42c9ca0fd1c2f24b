use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Address, Amount};

/// Message type of [`MsgSend`].
pub const TYPE_MSG_SEND: &str = "send";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: Amount,
}

impl MsgSend {
    pub fn new(from_address: Address, to_address: Address, amount: Amount) -> Self {
        Self {
            from_address,
            to_address,
            amount,
        }
    }
}
