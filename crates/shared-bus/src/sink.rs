//! # Publication Sink
//!
//! The collaborator the pipeline hands committed messages to.
//!
//! Production: `InMemoryEventBus` (fan-out to in-process subscribers that
//! forward to external brokers).
//! Testing: `RecordingSink`, `NoopSink`.

use crate::message::PubMsg;
use parking_lot::Mutex;
use thiserror::Error;

/// Publication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("publication sink closed")]
    Closed,

    #[error("publication rejected: {0}")]
    Rejected(String),
}

/// Receives committed `(key, value)` messages, once per publishable event.
pub trait PubMsgSink: Send + Sync {
    /// Publish one message. Returns the number of consumers that received it.
    fn publish(&self, key: &[u8], value: &[u8]) -> Result<usize, PublishError>;
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl PubMsgSink for NoopSink {
    fn publish(&self, _key: &[u8], _value: &[u8]) -> Result<usize, PublishError> {
        Ok(0)
    }
}

/// Sink that records every message, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<PubMsg>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<PubMsg> {
        self.messages.lock().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.messages.lock().iter().map(PubMsg::topic).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl PubMsgSink for RecordingSink {
    fn publish(&self, key: &[u8], value: &[u8]) -> Result<usize, PublishError> {
        self.messages.lock().push(PubMsg::new(key, value));
        Ok(1)
    }
}
