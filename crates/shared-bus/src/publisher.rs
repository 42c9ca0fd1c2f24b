//! # In-Memory Event Bus
//!
//! Production publication sink: fans committed messages out to in-process
//! subscribers (broker forwarders, websocket feeds).

use crate::message::{PubMsg, TopicFilter};
use crate::sink::{PubMsgSink, PublishError};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// In-memory implementation of the publication bus.
///
/// Uses `tokio::sync::broadcast` for multi-consumer semantics. A message
/// published while nobody is subscribed is dropped, in line with the
/// at-most-once delivery policy.
pub struct InMemoryEventBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<PubMsg>,

    /// Active subscription count by topic set.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: TopicFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}", filter.topics);

        *self
            .subscriptions
            .write()
            .entry(topic_key.clone())
            .or_insert(0) += 1;

        debug!(topics = ?filter.topics, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key)
    }

    /// Get a stream of messages matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: TopicFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total messages handed to the bus.
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PubMsgSink for InMemoryEventBus {
    fn publish(&self, key: &[u8], value: &[u8]) -> Result<usize, PublishError> {
        let msg = PubMsg::new(key, value);
        let topic = msg.topic();

        // Always increment counter (publication was attempted)
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(msg) {
            Ok(receiver_count) => {
                debug!(topic = %topic, receivers = receiver_count, "Message published");
                Ok(receiver_count)
            }
            Err(_) => {
                debug!(topic = %topic, "Message dropped (no receivers)");
                Ok(0)
            }
        }
    }
}
