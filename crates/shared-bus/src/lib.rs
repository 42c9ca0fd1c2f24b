//! # Shared Bus - Commit-Gated Event Publication
//!
//! Carries allow-listed module events to external consumers (market data
//! feeds, indexers) once the block that produced them is committed.
//!
//! ## Flow
//!
//! ```text
//!  BeginBlock        DeliverTx (ok / failed)        EndBlock          Commit
//!      │                   │                           │                 │
//!      ▼                   ▼                           ▼                 ▼
//! open_block ──▶ route_tx_events(success) ──▶ route_block_events ──▶ flush()
//!                  │ publishable + ok: buffer                           │
//!                  │ publishable + failed: drop                         ▼
//!                  └ everything else: back to the tx result      PubMsgSink::publish
//!                                                                (InMemoryEventBus)
//! ```
//!
//! ## Delivery Policy
//!
//! At-most-once. Publication happens after the block's events are final and
//! never blocks the storage commit; a sink failure is logged and counted, the
//! message is not retried.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod message;
pub mod pipeline;
pub mod publisher;
pub mod sink;
pub mod subscriber;

// Re-export main types
pub use message::{PubMsg, TopicFilter};
pub use pipeline::{EventPipeline, FlushReport, PipelineError, PipelineStats};
pub use publisher::InMemoryEventBus;
pub use sink::{NoopSink, PubMsgSink, PublishError, RecordingSink};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
