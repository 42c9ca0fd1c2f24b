//! # Lifecycle Messages
//!
//! Request and response types of the calls consensus makes into the
//! application, in call order:
//!
//! ```text
//! InitChain ─▶ ( BeginBlock ─▶ DeliverTx* ─▶ EndBlock ─▶ Commit )*
//! ```

use crate::entities::{BlockHeader, ValidatorUpdate};
use crate::errors::{CodeType, ModuleError, ROOT_CODESPACE};
use crate::events::Event;
use shared_store::StateDigest;

/// Genesis import request.
#[derive(Debug, Clone, Default)]
pub struct RequestInitChain {
    pub chain_id: String,
    /// Genesis time, unix seconds.
    pub time: u64,
    /// Validators consensus starts with. When non-empty they must match the
    /// set produced by the genesis import.
    pub validators: Vec<ValidatorUpdate>,
    /// Serialized app state: a JSON object keyed by module name.
    pub app_state_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInitChain {
    pub validators: Vec<ValidatorUpdate>,
    pub state_digest: StateDigest,
}

#[derive(Debug, Clone, Default)]
pub struct RequestBeginBlock {
    pub header: BlockHeader,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBeginBlock {
    pub events: Vec<Event>,
}

/// Outcome of one transaction. `code == 0` means success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDeliverTx {
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub events: Vec<Event>,
}

impl ResponseDeliverTx {
    pub fn is_ok(&self) -> bool {
        self.code == CodeType::Ok.as_u32()
    }

    pub fn from_error(err: &ModuleError, gas_wanted: u64, gas_used: u64) -> Self {
        Self {
            code: err.code,
            codespace: err.codespace.clone(),
            log: err.message.clone(),
            gas_wanted,
            gas_used,
            events: Vec::new(),
        }
    }

    /// Rejection before execution (undecodable bytes).
    pub fn decode_failure(log: impl Into<String>) -> Self {
        Self {
            code: CodeType::TxDecode.as_u32(),
            codespace: ROOT_CODESPACE.to_string(),
            log: log.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestEndBlock {
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEndBlock {
    pub validator_updates: Vec<ValidatorUpdate>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCommit {
    pub height: u64,
    pub state_digest: StateDigest,
}

#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
    /// `custom/<querier-route>/<path...>` or `app/<path>`.
    pub path: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseQuery {
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub value: Vec<u8>,
    pub height: u64,
}

impl ResponseQuery {
    pub fn is_ok(&self) -> bool {
        self.code == CodeType::Ok.as_u32()
    }

    pub fn from_error(err: &ModuleError, height: u64) -> Self {
        Self {
            code: err.code,
            codespace: err.codespace.clone(),
            log: err.message.clone(),
            value: Vec::new(),
            height,
        }
    }
}
