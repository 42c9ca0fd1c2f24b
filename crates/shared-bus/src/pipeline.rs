//! # Event Pipeline
//!
//! Per-block buffer between module events and the publication sink.
//!
//! ## Invariants
//!
//! | Rule | Description |
//! |------|-------------|
//! | Block scoped | The buffer is opened at BeginBlock and consumed at Commit |
//! | Outcome gated | Publishable events of a failed transaction never reach the sink |
//! | Ordered | Buffered messages are published in emission order |
//! | Once | Each buffered message is handed to the sink exactly one time |
//!
//! Non-publishable events always flow back to the caller untouched, for
//! successful and failed transactions alike.
//!
//! Publication is at-most-once: an event that fails to encode, or a message
//! the sink rejects, is logged at `warn`, counted in `failed` and not retried.

use crate::message::PubMsg;
use crate::sink::PubMsgSink;
use shared_types::Event;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Pipeline misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("no block is open in the event pipeline")]
    NoOpenBlock,

    #[error("block {open} is still open in the event pipeline")]
    AlreadyOpen { open: u64 },
}

/// Result of flushing one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub height: u64,
    /// Messages accepted by the sink.
    pub published: usize,
    /// Messages the sink rejected. Not retried.
    pub failed: usize,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub blocks_flushed: u64,
    pub published: u64,
    pub failed: u64,
    /// Publishable events dropped because their transaction failed.
    pub suppressed: u64,
}

#[derive(Debug)]
struct BlockBuffer {
    height: u64,
    messages: Vec<PubMsg>,
}

/// Commit-gated event pipeline.
pub struct EventPipeline {
    sink: Arc<dyn PubMsgSink>,
    current: Option<BlockBuffer>,
    stats: PipelineStats,
}

impl EventPipeline {
    #[must_use]
    pub fn new(sink: Arc<dyn PubMsgSink>) -> Self {
        Self {
            sink,
            current: None,
            stats: PipelineStats::default(),
        }
    }

    /// Start buffering for `height`.
    pub fn open_block(&mut self, height: u64) -> Result<(), PipelineError> {
        if let Some(open) = &self.current {
            return Err(PipelineError::AlreadyOpen { open: open.height });
        }
        self.current = Some(BlockBuffer {
            height,
            messages: Vec::new(),
        });
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Messages waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.current.as_ref().map_or(0, |b| b.messages.len())
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Route BeginBlock / EndBlock events. Publishable events are buffered;
    /// the rest is returned for the block result.
    pub fn route_block_events(&mut self, events: Vec<Event>) -> Result<Vec<Event>, PipelineError> {
        self.route(events, true)
    }

    /// Route the events of one transaction. Publishable events are buffered
    /// only when the transaction succeeded.
    pub fn route_tx_events(
        &mut self,
        events: Vec<Event>,
        success: bool,
    ) -> Result<Vec<Event>, PipelineError> {
        self.route(events, success)
    }

    fn route(&mut self, events: Vec<Event>, keep_publishable: bool) -> Result<Vec<Event>, PipelineError> {
        let buffer = self.current.as_mut().ok_or(PipelineError::NoOpenBlock)?;
        let mut passthrough = Vec::with_capacity(events.len());

        for event in events {
            if !event.publishable {
                passthrough.push(event);
                continue;
            }
            if !keep_publishable {
                self.stats.suppressed += 1;
                continue;
            }
            match PubMsg::from_event(buffer.height, &event) {
                Ok(msg) => buffer.messages.push(msg),
                Err(e) => {
                    warn!(kind = %event.kind, error = %e, "Failed to encode publishable event");
                    self.stats.failed += 1;
                }
            }
        }

        Ok(passthrough)
    }

    /// Publish the buffered block and close it.
    ///
    /// Sink failures are logged and counted; they never fail the flush.
    pub fn flush(&mut self) -> Result<FlushReport, PipelineError> {
        let buffer = self.current.take().ok_or(PipelineError::NoOpenBlock)?;
        let mut report = FlushReport {
            height: buffer.height,
            ..Default::default()
        };

        for msg in &buffer.messages {
            match self.sink.publish(&msg.key, &msg.value) {
                Ok(_) => report.published += 1,
                Err(e) => {
                    warn!(
                        height = buffer.height,
                        topic = %msg.topic(),
                        error = %e,
                        "Publication failed, message dropped"
                    );
                    report.failed += 1;
                }
            }
        }

        self.stats.blocks_flushed += 1;
        self.stats.published += report.published as u64;
        self.stats.failed += report.failed as u64;

        if report.published + report.failed > 0 {
            info!(
                "[pipeline] Block {} flushed: {} published, {} failed",
                report.height, report.published, report.failed
            );
        } else {
            debug!("[pipeline] Block {} flushed: nothing to publish", report.height);
        }
        Ok(report)
    }

    /// Throw away the open block without publishing (application halt).
    pub fn discard(&mut self) {
        if let Some(buffer) = self.current.take() {
            warn!(
                "[pipeline] Discarding {} unpublished messages of block {}",
                buffer.messages.len(),
                buffer.height
            );
        }
    }
}
