use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Address, Amount};

pub const TYPE_MSG_CREATE_VALIDATOR: &str = "create_validator";
pub const TYPE_MSG_DELEGATE: &str = "delegate";

/// Register `operator` as a validator, self-delegating `self_delegation`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateValidator {
    pub operator: Address,
    pub pub_key: String,
    #[serde(default)]
    pub moniker: String,
    #[serde_as(as = "DisplayFromStr")]
    pub self_delegation: Amount,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegate {
    pub delegator: Address,
    pub validator: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: Amount,
}
