//! # Transactions and the Message Codec
//!
//! Transactions travel as JSON. Each message names its module route and its
//! type; the [`Codec`] only accepts `(route, type)` pairs that a registered
//! module declared in `register_codec`.

use crate::entities::{Address, Amount};
use crate::errors::{CodeType, ModuleError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeMap;
use thiserror::Error;

/// A single module message inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Msg {
    pub route: String,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub value: serde_json::Value,
}

impl Msg {
    pub fn new<T: Serialize>(
        route: impl Into<String>,
        msg_type: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            route: route.into(),
            msg_type: msg_type.into(),
            value: serde_json::to_value(value)?,
        })
    }

    /// Decode the message body into the handler's concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ModuleError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            ModuleError::root(
                CodeType::TxDecode,
                format!("invalid {}/{} message: {}", self.route, self.msg_type, e),
            )
        })
    }
}

/// Signed-by-convention transaction. Signature checking belongs to consensus
/// tooling outside this state machine; the ante step checks signer and
/// sequence.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    pub msgs: Vec<Msg>,
    #[serde_as(as = "DisplayFromStr")]
    pub fee: Amount,
    pub gas: u64,
    pub signer: Address,
    pub sequence: u64,
    #[serde(default)]
    pub memo: String,
}

/// Codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("tx parse error: {0}")]
    Malformed(String),

    #[error("unregistered message type {route}/{msg_type}")]
    Unregistered { route: String, msg_type: String },

    #[error("message type {route}/{msg_type} registered twice")]
    Duplicate { route: String, msg_type: String },
}

/// Registry of accepted message types.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    msgs: BTreeMap<(String, String), &'static str>,
}

impl Codec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route/msg_type`, owned by `module`.
    pub fn register_msg(
        &mut self,
        module: &'static str,
        route: &str,
        msg_type: &str,
    ) -> Result<(), CodecError> {
        let key = (route.to_string(), msg_type.to_string());
        if self.msgs.contains_key(&key) {
            return Err(CodecError::Duplicate {
                route: key.0,
                msg_type: key.1,
            });
        }
        self.msgs.insert(key, module);
        Ok(())
    }

    pub fn is_registered(&self, route: &str, msg_type: &str) -> bool {
        self.msgs
            .contains_key(&(route.to_string(), msg_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn encode_tx(&self, tx: &Tx) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(tx).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    /// Decode raw bytes, rejecting message types nobody registered.
    pub fn decode_tx(&self, bytes: &[u8]) -> Result<Tx, CodecError> {
        let tx: Tx =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;
        for msg in &tx.msgs {
            if !self.is_registered(&msg.route, &msg.msg_type) {
                return Err(CodecError::Unregistered {
                    route: msg.route.clone(),
                    msg_type: msg.msg_type.clone(),
                });
            }
        }
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tx() -> Tx {
        Tx {
            msgs: vec![Msg::new("bank", "send", &json!({"amount": "5"})).unwrap()],
            fee: 100,
            gas: 200_000,
            signer: Address::new([1; 20]),
            sequence: 0,
            memo: String::new(),
        }
    }

    #[test]
    fn test_decode_accepts_registered_messages() {
        let mut codec = Codec::new();
        codec.register_msg("bank", "bank", "send").unwrap();

        let bytes = codec.encode_tx(&sample_tx()).unwrap();
        let decoded = codec.decode_tx(&bytes).unwrap();
        assert_eq!(decoded.fee, 100);
        assert_eq!(decoded.msgs[0].msg_type, "send");
    }

    #[test]
    fn test_decode_rejects_unregistered_and_malformed() {
        let codec = Codec::new();
        let bytes = serde_json::to_vec(&sample_tx()).unwrap();

        assert!(matches!(
            codec.decode_tx(&bytes),
            Err(CodecError::Unregistered { .. })
        ));
        assert!(matches!(
            codec.decode_tx(b"not json"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut codec = Codec::new();
        codec.register_msg("bank", "bank", "send").unwrap();
        assert!(codec.register_msg("other", "bank", "send").is_err());
    }

    #[test]
    fn test_fee_is_encoded_as_decimal_string() {
        let value = serde_json::to_value(sample_tx()).unwrap();
        assert_eq!(value["fee"], json!("100"));
    }
}
