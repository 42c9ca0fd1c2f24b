//! # Lifecycle Orchestrator
//!
//! Drives the assembled application through the calls consensus makes.
//!
//! ```text
//!                 InitChain
//! Uninitialized ────────────▶ ChainInitialized ─┐
//!                                               │ BeginBlock
//!       ┌───────────────────────────────────────┘
//!       ▼
//!   BlockOpen ──DeliverTx──▶ TxPending ──EndBlock──▶ BlockClosing
//!       │                     │    ▲                      │
//!       │                     └────┘                      │ Commit
//!       └─────────EndBlock────────────────────────────────┤
//!                                                         ▼
//!                       BeginBlock (height + 1)       Committed
//!   BlockOpen ◀───────────────────────────────────────────┘
//!
//!   any fatal error ──▶ Halted (lifecycle calls rejected)
//! ```
//!
//! ## Working set
//!
//! One `CacheMultiStore` lives from BeginBlock to Commit. Every transaction
//! takes a journal checkpoint first and reverts to it on failure, so a failed
//! transaction (ante fee included) leaves no trace in the block.
//!
//! ## Publication
//!
//! Publishable events are buffered by the [`EventPipeline`] and flushed only
//! after the store commit succeeded. A storage failure discards the buffer.

pub mod tx_runner;

pub use tx_runner::TxRunner;

use crate::container::{AppConfig, AppContainer};
use crate::errors::AppError;
use shared_bus::{EventPipeline, PipelineStats, PubMsgSink};
use shared_store::{CacheMultiStore, CommitMultiStore, KeyValueStore};
use shared_types::{
    AppState, BlockHeader, Context, ModuleError, RequestBeginBlock, RequestEndBlock,
    RequestInitChain, RequestQuery, ResponseBeginBlock, ResponseCommit, ResponseDeliverTx,
    ResponseEndBlock, ResponseInitChain, ResponseQuery, ValidatorUpdate,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const CHAIN_ID_KEY: &[u8] = b"chain_id";

/// Where the application is in the block lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    ChainInitialized,
    BlockOpen,
    TxPending,
    BlockClosing,
    Committed,
    Halted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::ChainInitialized => "chain-initialized",
            Self::BlockOpen => "block-open",
            Self::TxPending => "tx-pending",
            Self::BlockClosing => "block-closing",
            Self::Committed => "committed",
            Self::Halted => "halted",
        };
        f.write_str(name)
    }
}

/// Genesis snapshot of the last committed state.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedApp {
    pub app_state: AppState,
    /// Bonded validators at export time.
    pub validators: Vec<ValidatorUpdate>,
    pub height: u64,
}

/// The deterministic application.
pub struct DexApp {
    store: CommitMultiStore,
    container: AppContainer,
    pipeline: EventPipeline,
    state: LifecycleState,
    chain_id: String,
    /// Block working set, BeginBlock to Commit.
    working: Option<CacheMultiStore>,
    header: Option<BlockHeader>,
    halt_reason: Option<String>,
}

impl DexApp {
    /// Assemble the application over `db`. A store that already holds a
    /// committed version resumes at that height without InitChain.
    pub fn new(
        config: &AppConfig,
        db: Arc<dyn KeyValueStore>,
        sink: Arc<dyn PubMsgSink>,
    ) -> Result<Self, AppError> {
        let mut store = CommitMultiStore::new(db);
        let container = AppContainer::build(&mut store, config)?;

        let (state, chain_id) = match store.load_latest()? {
            Some(info) => {
                let chain_id = store
                    .cache_wrap()
                    .get(&container.main_key, CHAIN_ID_KEY)?
                    .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                    .unwrap_or_else(|| config.chain_id.clone());
                info!(
                    "[app] Resuming chain '{}' at height {} (digest {})",
                    chain_id, info.height, info.digest
                );
                (LifecycleState::Committed, chain_id)
            }
            None => {
                info!("[app] Empty store, waiting for InitChain");
                (LifecycleState::Uninitialized, config.chain_id.clone())
            }
        };

        Ok(Self {
            store,
            container,
            pipeline: EventPipeline::new(sink),
            state,
            chain_id,
            working: None,
            header: None,
            halt_reason: None,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == LifecycleState::Halted
    }

    pub fn halt_reason(&self) -> Option<&str> {
        self.halt_reason.as_deref()
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Height of the last committed version, if any.
    pub fn last_height(&self) -> Option<u64> {
        self.store.last_commit().map(|info| info.height)
    }

    pub fn container(&self) -> &AppContainer {
        &self.container
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Validate and import the genesis state, then commit it as height 0.
    ///
    /// Every module's genesis is validated before anything is written; on any
    /// failure the store is left untouched and the app stays uninitialized.
    pub fn init_chain(&mut self, req: RequestInitChain) -> Result<ResponseInitChain, AppError> {
        self.require_state("InitChain", &[LifecycleState::Uninitialized])?;

        let app_state = if req.app_state_bytes.is_empty() {
            AppState::new()
        } else {
            AppState::from_bytes(&req.app_state_bytes)
                .map_err(|e| AppError::AppStateDecode(e.to_string()))?
        };
        self.container.basics.validate_genesis(&app_state)?;

        let header = BlockHeader {
            chain_id: req.chain_id.clone(),
            height: 0,
            time: req.time,
            ..Default::default()
        };
        let mut cache = self.store.cache_wrap();
        let validators = {
            let mut ctx = Context::new(&mut cache, header, Arc::clone(&self.container.allow_list));
            self.container.manager.init_genesis(&mut ctx, &app_state)?
        };

        if !req.validators.is_empty() {
            let mut expected = req.validators.clone();
            let mut produced = validators.clone();
            expected.sort();
            produced.sort();
            if expected != produced {
                return Err(AppError::ValidatorMismatch { expected, produced });
            }
        }

        cache.set(&self.container.main_key, CHAIN_ID_KEY, req.chain_id.as_bytes().to_vec())?;
        let info = match self.store.commit(cache, 0) {
            Ok(info) => info,
            Err(e) => {
                self.halt(format!("genesis commit failed: {}", e));
                return Err(e.into());
            }
        };

        self.chain_id = req.chain_id;
        self.state = LifecycleState::ChainInitialized;
        info!(
            "[app] Chain '{}' initialized: {} modules imported, {} validators, digest {}",
            self.chain_id,
            app_state.len(),
            validators.len(),
            info.digest
        );
        Ok(ResponseInitChain {
            validators,
            state_digest: info.digest,
        })
    }

    /// Open block `req.header.height`, which must follow the last commit.
    pub fn begin_block(&mut self, req: RequestBeginBlock) -> Result<ResponseBeginBlock, AppError> {
        self.require_state(
            "BeginBlock",
            &[LifecycleState::ChainInitialized, LifecycleState::Committed],
        )?;
        let last = self.last_height().ok_or(AppError::NoCommittedState)?;
        let height = req.header.height;
        if height != last + 1 {
            return Err(AppError::NonSequentialHeight { last, got: height });
        }
        if !req.header.chain_id.is_empty() && req.header.chain_id != self.chain_id {
            return Err(AppError::ChainIdMismatch {
                expected: self.chain_id.clone(),
                got: req.header.chain_id.clone(),
            });
        }

        let mut header = req.header.clone();
        header.chain_id = self.chain_id.clone();
        self.pipeline.open_block(height)?;

        let mut working = self.store.cache_wrap();
        let (result, events) = {
            let mut ctx = Context::new(
                &mut working,
                header.clone(),
                Arc::clone(&self.container.allow_list),
            );
            let result = self.container.manager.begin_block(&mut ctx, &req);
            (result, ctx.take_events())
        };
        if let Err(e) = result {
            self.halt(format!("begin block {} failed: {}", height, e));
            return Err(e.into());
        }

        let events = self.pipeline.route_block_events(events)?;
        working.discard_journal();
        self.working = Some(working);
        self.header = Some(header);
        self.state = LifecycleState::BlockOpen;
        debug!(height, "[app] block opened");
        Ok(ResponseBeginBlock { events })
    }

    /// Execute one transaction. Failures are reported in the response and
    /// leave no state behind; only fatal errors surface as `Err`.
    pub fn deliver_tx(&mut self, tx_bytes: &[u8]) -> Result<ResponseDeliverTx, AppError> {
        self.require_state(
            "DeliverTx",
            &[LifecycleState::BlockOpen, LifecycleState::TxPending],
        )?;
        let state = self.state;
        let (Some(working), Some(header)) = (self.working.as_mut(), self.header.as_ref()) else {
            return Err(AppError::InvalidState {
                call: "DeliverTx",
                state,
            });
        };

        let tx = match self.container.runner.decode(tx_bytes) {
            Ok(tx) => tx,
            Err(e) => {
                debug!(error = %e, "[app] tx rejected at decode");
                self.state = LifecycleState::TxPending;
                return Ok(ResponseDeliverTx::decode_failure(e.to_string()));
            }
        };

        let checkpoint = working.checkpoint();
        let (result, events, gas_used) = {
            let mut ctx = Context::new(working, header.clone(), Arc::clone(&self.container.allow_list))
                .with_gas_limit(tx.gas)
                .with_signer(tx.signer);
            let result = self.container.runner.run(&mut ctx, &tx, tx_bytes.len());
            let gas_used = ctx.gas_consumed();
            (result, ctx.take_events(), gas_used)
        };

        match result {
            Ok(()) => {
                working.discard_journal();
                let events = self.pipeline.route_tx_events(events, true)?;
                self.state = LifecycleState::TxPending;
                debug!(signer = %tx.signer, gas_used, "[app] tx delivered");
                Ok(ResponseDeliverTx {
                    gas_wanted: tx.gas,
                    gas_used,
                    events,
                    ..Default::default()
                })
            }
            Err(err) => {
                let reverted = working.revert_to(checkpoint);
                if let Err(e) = reverted {
                    self.halt(format!("tx revert failed: {}", e));
                    return Err(e.into());
                }
                working.discard_journal();
                let events = self.pipeline.route_tx_events(events, false)?;
                if err.fatal {
                    self.halt(format!("fatal tx error: {}", err));
                    return Err(err.into());
                }

                self.state = LifecycleState::TxPending;
                debug!(signer = %tx.signer, code = err.code, log = %err.message, "[app] tx failed");
                Ok(ResponseDeliverTx {
                    events,
                    ..ResponseDeliverTx::from_error(&err, tx.gas, gas_used)
                })
            }
        }
    }

    /// Run the end blockers of the open block.
    pub fn end_block(&mut self, req: RequestEndBlock) -> Result<ResponseEndBlock, AppError> {
        self.require_state(
            "EndBlock",
            &[LifecycleState::BlockOpen, LifecycleState::TxPending],
        )?;
        let state = self.state;
        let (Some(working), Some(header)) = (self.working.as_mut(), self.header.as_ref()) else {
            return Err(AppError::InvalidState {
                call: "EndBlock",
                state,
            });
        };
        if req.height != header.height {
            return Err(AppError::HeightMismatch {
                open: header.height,
                got: req.height,
            });
        }

        let (result, events) = {
            let mut ctx = Context::new(working, header.clone(), Arc::clone(&self.container.allow_list));
            let result = self.container.manager.end_block(&mut ctx, &req);
            (result, ctx.take_events())
        };
        let validator_updates = match result {
            Ok(updates) => updates,
            Err(e) => {
                self.halt(format!("end block {} failed: {}", req.height, e));
                return Err(e.into());
            }
        };
        working.discard_journal();

        let events = self.pipeline.route_block_events(events)?;
        self.state = LifecycleState::BlockClosing;
        if !validator_updates.is_empty() {
            info!(
                height = req.height,
                updates = validator_updates.len(),
                "[app] validator set changed"
            );
        }
        Ok(ResponseEndBlock {
            validator_updates,
            events,
        })
    }

    /// Persist the block, then publish its buffered events.
    pub fn commit(&mut self) -> Result<ResponseCommit, AppError> {
        self.require_state("Commit", &[LifecycleState::BlockClosing])?;
        let (Some(working), Some(header)) = (self.working.take(), self.header.take()) else {
            return Err(AppError::InvalidState {
                call: "Commit",
                state: self.state,
            });
        };

        let info = match self.store.commit(working, header.height) {
            Ok(info) => info,
            Err(e) => {
                self.halt(format!("commit of block {} failed: {}", header.height, e));
                return Err(e.into());
            }
        };
        let report = self.pipeline.flush()?;

        self.state = LifecycleState::Committed;
        info!(
            "[app] Committed block {} (digest {}, {} events published)",
            info.height, info.digest, report.published
        );
        Ok(ResponseCommit {
            height: info.height,
            state_digest: info.digest,
        })
    }

    /// Answer a read against the last committed state. Never fails the
    /// caller; errors come back as a non-zero code.
    pub fn query(&self, req: &RequestQuery) -> ResponseQuery {
        let height = self.last_height().unwrap_or(0);
        match self.run_query(req, height) {
            Ok(value) => ResponseQuery {
                value,
                height,
                ..Default::default()
            },
            Err(e) => {
                debug!(path = %req.path, error = %e, "[app] query failed");
                ResponseQuery::from_error(&e, height)
            }
        }
    }

    fn run_query(&self, req: &RequestQuery, height: u64) -> Result<Vec<u8>, ModuleError> {
        let parts: Vec<&str> = req.path.split('/').filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            ["app", "height"] => Ok(serde_json::to_vec(&height)?),
            ["app", "digest"] => {
                let digest = self
                    .store
                    .last_commit()
                    .map(|info| info.digest.to_hex())
                    .unwrap_or_default();
                Ok(serde_json::to_vec(&digest)?)
            }
            ["custom", route, rest @ ..] => {
                let module = self.container.queries.route(route).ok_or_else(|| {
                    ModuleError::unknown_request(format!("unknown query route: {}", route))
                })?;
                let mut cache = self.store.cache_wrap();
                let ctx = Context::new(
                    &mut cache,
                    self.committed_header(height),
                    Arc::clone(&self.container.allow_list),
                );
                module.query(&ctx, rest, &req.data)
            }
            _ => Err(ModuleError::unknown_request(format!(
                "unknown query path: {}",
                req.path
            ))),
        }
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    /// Genesis snapshot of the last committed state, in export order.
    pub fn export_genesis(&self) -> Result<AppState, AppError> {
        let height = self.last_height().ok_or(AppError::NoCommittedState)?;
        let mut cache = self.store.cache_wrap();
        let ctx = Context::new(
            &mut cache,
            self.committed_header(height),
            Arc::clone(&self.container.allow_list),
        );
        Ok(self.container.manager.export_genesis(&ctx)?)
    }

    /// Genesis snapshot plus the bonded validator set.
    pub fn export_app_state_and_validators(&self) -> Result<ExportedApp, AppError> {
        let height = self.last_height().ok_or(AppError::NoCommittedState)?;
        let app_state = self.export_genesis()?;

        let mut cache = self.store.cache_wrap();
        let ctx = Context::new(
            &mut cache,
            self.committed_header(height),
            Arc::clone(&self.container.allow_list),
        );
        let validators = self
            .container
            .keepers
            .staking
            .bonded_validators(&ctx)?
            .iter()
            .map(|v| v.update())
            .collect();

        Ok(ExportedApp {
            app_state,
            validators,
            height,
        })
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn committed_header(&self, height: u64) -> BlockHeader {
        BlockHeader {
            chain_id: self.chain_id.clone(),
            height,
            ..Default::default()
        }
    }

    fn require_state(&self, call: &'static str, allowed: &[LifecycleState]) -> Result<(), AppError> {
        if self.state == LifecycleState::Halted {
            let reason = self.halt_reason.clone().unwrap_or_default();
            warn!(call, "[app] rejected, application halted");
            return Err(AppError::Halted(reason));
        }
        if !allowed.contains(&self.state) {
            return Err(AppError::InvalidState {
                call,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Stop the application. The open block and its unpublished events are
    /// dropped; queries and exports of the committed state keep working.
    pub fn halt(&mut self, reason: String) {
        error!("[app] HALT: {}", reason);
        self.pipeline.discard();
        self.working = None;
        self.header = None;
        self.state = LifecycleState::Halted;
        self.halt_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::NoopSink;
    use shared_store::InMemoryKVStore;

    fn app() -> DexApp {
        DexApp::new(
            &AppConfig::default(),
            Arc::new(InMemoryKVStore::new()),
            Arc::new(NoopSink),
        )
        .unwrap()
    }

    fn init(app: &mut DexApp) {
        app.init_chain(RequestInitChain {
            chain_id: "dex-chain".into(),
            ..Default::default()
        })
        .unwrap();
    }

    fn header(height: u64) -> RequestBeginBlock {
        RequestBeginBlock {
            header: BlockHeader {
                chain_id: "dex-chain".into(),
                height,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_fresh_store_waits_for_init_chain() {
        let mut app = app();
        assert_eq!(app.state(), LifecycleState::Uninitialized);
        assert!(matches!(
            app.begin_block(header(1)),
            Err(AppError::InvalidState { call: "BeginBlock", .. })
        ));

        init(&mut app);
        assert_eq!(app.state(), LifecycleState::ChainInitialized);
        assert_eq!(app.last_height(), Some(0));
    }

    #[test]
    fn test_empty_block_cycle() {
        let mut app = app();
        init(&mut app);

        app.begin_block(header(1)).unwrap();
        assert_eq!(app.state(), LifecycleState::BlockOpen);
        let end = app.end_block(RequestEndBlock { height: 1 }).unwrap();
        assert!(end.validator_updates.is_empty());
        let commit = app.commit().unwrap();
        assert_eq!(commit.height, 1);
        assert_eq!(app.state(), LifecycleState::Committed);
    }

    #[test]
    fn test_height_and_chain_checks() {
        let mut app = app();
        init(&mut app);

        assert_eq!(
            app.begin_block(header(2)).unwrap_err(),
            AppError::NonSequentialHeight { last: 0, got: 2 }
        );

        let mut wrong_chain = header(1);
        wrong_chain.header.chain_id = "other".into();
        assert!(matches!(
            app.begin_block(wrong_chain),
            Err(AppError::ChainIdMismatch { .. })
        ));

        app.begin_block(header(1)).unwrap();
        assert_eq!(
            app.end_block(RequestEndBlock { height: 3 }).unwrap_err(),
            AppError::HeightMismatch { open: 1, got: 3 }
        );
        assert!(matches!(
            app.commit(),
            Err(AppError::InvalidState { call: "Commit", .. })
        ));
    }

    #[test]
    fn test_undecodable_tx_is_a_response_not_an_error() {
        let mut app = app();
        init(&mut app);
        app.begin_block(header(1)).unwrap();

        let res = app.deliver_tx(b"not json").unwrap();
        assert!(!res.is_ok());
        assert_eq!(app.state(), LifecycleState::TxPending);
    }

    #[test]
    fn test_halt_rejects_lifecycle_but_not_queries() {
        let mut app = app();
        init(&mut app);
        app.halt("test".to_string());

        assert_eq!(
            app.begin_block(header(1)).unwrap_err(),
            AppError::Halted("test".to_string())
        );
        let res = app.query(&RequestQuery {
            path: "app/height".into(),
            data: Vec::new(),
        });
        assert!(res.is_ok());
        assert_eq!(res.value, b"0".to_vec());
        assert!(app.export_genesis().is_ok());
    }

    #[test]
    fn test_unknown_query_path() {
        let app = app();
        for path in ["nope", "custom/unknown/x", "app/other"] {
            let res = app.query(&RequestQuery {
                path: path.into(),
                data: Vec::new(),
            });
            assert_eq!(res.code, shared_types::CodeType::UnknownRequest.as_u32());
        }
    }
}
