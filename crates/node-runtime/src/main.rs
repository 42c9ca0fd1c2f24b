//! # Dex-Chain Node Runtime
//!
//! Runs the application with a local development block loop standing in for
//! consensus: one empty block per `DX_BLOCK_INTERVAL_MS`.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `DX_*` environment variables
//! 2. Open the store (memory or RocksDB)
//! 3. Assemble the application; resume if the store holds a committed version
//! 4. Otherwise run InitChain with `DX_GENESIS` or the default genesis
//! 5. Produce blocks until Ctrl+C, then export the genesis to `DX_EXPORT`

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::container::StorageBackend;
use node_runtime::{AppConfig, DexApp};
use shared_bus::{InMemoryEventBus, TopicFilter};
use shared_store::{InMemoryKVStore, KeyValueStore};
use shared_types::{BlockHeader, RequestBeginBlock, RequestEndBlock, RequestInitChain};

fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory store (state is lost on exit)");
            Ok(Arc::new(InMemoryKVStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => {
            info!("Opening RocksDB at {}", config.storage.data_dir.display());
            let store = shared_store::RocksDbStore::open_default(&config.storage.data_dir)
                .context("failed to open RocksDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => {
            anyhow::bail!("DX_STORAGE=rocksdb requires the `rocksdb` feature")
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn init_chain(app: &mut DexApp, config: &AppConfig) -> Result<()> {
    let app_state_bytes = match &config.genesis_file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read genesis file {}", path.display()))?,
        None => {
            info!("No DX_GENESIS set, using the default genesis");
            app.container().basics.default_genesis().to_bytes()?
        }
    };

    let res = app.init_chain(RequestInitChain {
        chain_id: config.chain_id.clone(),
        time: unix_now(),
        validators: Vec::new(),
        app_state_bytes,
    })?;
    info!(
        "Genesis committed: {} validators, digest {}",
        res.validators.len(),
        res.state_digest
    );
    Ok(())
}

fn produce_block(app: &mut DexApp) -> Result<()> {
    let height = app.last_height().unwrap_or(0) + 1;
    app.begin_block(RequestBeginBlock {
        header: BlockHeader {
            chain_id: app.chain_id().to_string(),
            height,
            time: unix_now(),
            ..Default::default()
        },
    })?;
    let end = app.end_block(RequestEndBlock { height })?;
    if !end.validator_updates.is_empty() {
        info!("Block {}: {} validator updates", height, end.validator_updates.len());
    }
    app.commit()?;
    Ok(())
}

fn export(app: &DexApp, config: &AppConfig) -> Result<()> {
    let Some(path) = &config.export_file else {
        return Ok(());
    };
    let exported = app.export_app_state_and_validators()?;
    std::fs::write(path, exported.app_state.to_pretty_bytes()?)
        .with_context(|| format!("failed to write export file {}", path.display()))?;
    info!(
        "Exported genesis at height {} ({} validators) to {}",
        exported.height,
        exported.validators.len(),
        path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::from_env()?;
    info!("Starting Dex-Chain node for chain '{}'", config.chain_id);

    let bus = Arc::new(InMemoryEventBus::with_capacity(config.publish.channel_capacity));
    let mut subscription = bus.subscribe(TopicFilter::all());
    tokio::spawn(async move {
        while let Some(msg) = subscription.recv().await {
            debug!(topic = %msg.topic(), bytes = msg.value.len(), "Published event");
        }
    });

    let db = open_store(&config)?;
    let mut app = DexApp::new(&config, db, bus)?;
    if app.last_height().is_none() {
        init_chain(&mut app, &config)?;
    }

    info!("Node is running. Press Ctrl+C to stop.");
    let mut ticker = tokio::time::interval(Duration::from_millis(config.block_interval_ms.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = produce_block(&mut app) {
                    error!("Block production stopped: {:#}", e);
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    export(&app, &config)?;
    info!("Node stopped at height {}", app.last_height().unwrap_or(0));
    Ok(())
}
