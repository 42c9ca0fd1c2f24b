//! # Application Container
//!
//! Composition root: builds every module, keeper, route table and command
//! tree exactly once and hands the finished graph to the orchestrator.
//!
//! ## Assembly phases
//!
//! | Phase | Produces |
//! |-------|----------|
//! | 1 | Basic manager (registration order) and validated permission table |
//! | 2 | Mounted store keys |
//! | 3 | Keepers, with the staking ⇄ distribution cycle bound |
//! | 4 | Modules, frozen invariant registry, crisis module |
//! | 5 | Module manager with per-phase orders, routers |
//! | 6 | Codec, tx runner, genesis tx deliverer, REST routes, commands, allow list |
//!
//! Registration order is the default iteration order everywhere (codec,
//! routes, commands, genesis validation).

pub mod config;
pub mod keepers;

pub use config::{AppConfig, ConfigError, PublishConfig, StorageBackend, StorageConfig};
pub use keepers::{permission_table, Keepers, MAIN_STORE_KEY};

use crate::adapters::GenesisTxAdapter;
use crate::app::TxRunner;
use crate::errors::AppError;
use crate::registry::{BasicManager, ModuleManager, Router};
use dx_01_auth::{AnteHandler, AuthModule, AuthModuleBasic, FeeCollector};
use dx_02_bank::{BankModule, BankModuleBasic};
use dx_03_supply::{SupplyModule, SupplyModuleBasic};
use dx_04_staking::{StakingModule, StakingModuleBasic};
use dx_05_distribution::{DistrModule, DistrModuleBasic};
use dx_06_crisis::{CrisisKeeper, CrisisModule, CrisisModuleBasic};
use dx_07_genutil::{GenesisTxDeliverer, GenutilModule, GenutilModuleBasic};
use keepers::StoreKeys;
use shared_store::CommitMultiStore;
use shared_types::{
    AllowList, AppModule, Codec, Command, Deferred, InvariantRegistry, RestRoutes, StoreKey,
};
use std::sync::Arc;
use tracing::info;

/// Begin-block order: fees are allocated before anything else touches the
/// fee collector.
pub const BEGIN_BLOCKERS: [&str; 7] = [
    dx_05_distribution::MODULE_NAME,
    dx_01_auth::MODULE_NAME,
    dx_02_bank::MODULE_NAME,
    dx_03_supply::MODULE_NAME,
    dx_04_staking::MODULE_NAME,
    dx_06_crisis::MODULE_NAME,
    dx_07_genutil::MODULE_NAME,
];

/// End-block order: crisis last, so invariants see the state the block will
/// commit, pool moves of the validator-set update included.
pub const END_BLOCKERS: [&str; 7] = [
    dx_04_staking::MODULE_NAME,
    dx_01_auth::MODULE_NAME,
    dx_02_bank::MODULE_NAME,
    dx_03_supply::MODULE_NAME,
    dx_05_distribution::MODULE_NAME,
    dx_07_genutil::MODULE_NAME,
    dx_06_crisis::MODULE_NAME,
];

/// Genesis order: genutil last, once balances and staking params exist.
pub const INIT_GENESIS: [&str; 7] = [
    dx_01_auth::MODULE_NAME,
    dx_03_supply::MODULE_NAME,
    dx_02_bank::MODULE_NAME,
    dx_05_distribution::MODULE_NAME,
    dx_04_staking::MODULE_NAME,
    dx_06_crisis::MODULE_NAME,
    dx_07_genutil::MODULE_NAME,
];

/// The assembled application graph.
pub struct AppContainer {
    pub basics: BasicManager,
    pub manager: ModuleManager,
    pub keepers: Keepers,
    pub crisis: Arc<CrisisKeeper>,
    pub runner: Arc<TxRunner>,
    pub queries: Router,
    pub rest_routes: RestRoutes,
    pub tx_commands: Command,
    pub query_commands: Command,
    pub allow_list: Arc<AllowList>,
    /// Namespace of the application itself.
    pub main_key: StoreKey,
}

impl AppContainer {
    /// Assemble the application and mount its namespaces on `store`.
    ///
    /// # Panics
    ///
    /// Panics if a phase order is not a permutation of the registered modules.
    pub fn build(store: &mut CommitMultiStore, config: &AppConfig) -> Result<Self, AppError> {
        info!("[container] Assembling application for chain '{}'", config.chain_id);

        info!("[container] Phase 1: module basics and account permissions");
        let basics = BasicManager::try_new(vec![
            Box::new(AuthModuleBasic),
            Box::new(BankModuleBasic),
            Box::new(SupplyModuleBasic),
            Box::new(DistrModuleBasic),
            Box::new(StakingModuleBasic),
            Box::new(CrisisModuleBasic),
            Box::new(GenutilModuleBasic),
        ])?;
        let permissions = permission_table();
        permissions.validate_against(basics.module_accounts())?;

        info!("[container] Phase 2: mounting store keys");
        let keys = StoreKeys::mount(store)?;

        info!("[container] Phase 3: keepers");
        let keepers = Keepers::build(
            keys.accounts,
            keys.bank,
            keys.supply,
            keys.staking,
            keys.distribution,
            permissions,
        )?;

        info!("[container] Phase 4: modules and invariants");
        let genesis_txs: Deferred<dyn GenesisTxDeliverer> = Deferred::new("genesis tx deliverer");
        let mut modules: Vec<Arc<dyn AppModule>> = vec![
            Arc::new(AuthModule::new(Arc::clone(&keepers.accounts))),
            Arc::new(BankModule::new(Arc::clone(&keepers.bank))),
            Arc::new(SupplyModule::new(Arc::clone(&keepers.supply))),
            Arc::new(DistrModule::new(Arc::clone(&keepers.distribution))),
            Arc::new(StakingModule::new(Arc::clone(&keepers.staking))),
        ];
        let mut invariants = InvariantRegistry::new();
        for module in &modules {
            module.register_invariants(&mut invariants);
        }
        let invariants = Arc::new(invariants);
        info!(
            "[container]   {} invariants registered, checked every {} blocks",
            invariants.len(),
            config.inv_check_period
        );
        let crisis = Arc::new(CrisisKeeper::new(
            keys.crisis,
            invariants,
            config.inv_check_period,
            Arc::clone(&keepers.supply),
        ));
        modules.push(Arc::new(CrisisModule::new(Arc::clone(&crisis))));
        modules.push(Arc::new(GenutilModule::new(genesis_txs.clone())));

        info!("[container] Phase 5: module manager and routers");
        let mut manager = ModuleManager::try_new(modules)?;
        manager.set_order_begin_blockers(&BEGIN_BLOCKERS);
        manager.set_order_end_blockers(&END_BLOCKERS);
        manager.set_order_init_genesis(&INIT_GENESIS);
        let (msgs, queries) = manager.build_routers()?;

        info!("[container] Phase 6: codec, tx runner and client surfaces");
        let mut codec = Codec::new();
        basics.register_codec(&mut codec)?;
        let fees = Arc::clone(&keepers.supply) as Arc<dyn FeeCollector>;
        let ante = AnteHandler::new(Arc::clone(&keepers.accounts), fees);
        let runner = Arc::new(TxRunner::new(codec, ante, msgs));
        genesis_txs.resolve(Arc::new(GenesisTxAdapter::new(
            Arc::clone(&runner),
            Arc::clone(&keepers.staking),
        )))?;

        let mut rest_routes = RestRoutes::new();
        basics.register_rest_routes(&mut rest_routes);
        let mut tx_commands = Command::new("tx", "Transactions subcommands");
        basics.add_tx_commands(&mut tx_commands);
        let mut query_commands = Command::new("query", "Querying subcommands");
        basics.add_query_commands(&mut query_commands);

        let allow_list = Arc::new(allow_list(&basics, config));
        info!(
            "[container] Assembled {} modules ({} msg routes, {} query routes, {} publishable kinds)",
            manager.len(),
            runner.router().len(),
            queries.len(),
            allow_list.len()
        );

        Ok(Self {
            basics,
            manager,
            keepers,
            crisis,
            runner,
            queries,
            rest_routes,
            tx_commands,
            query_commands,
            allow_list,
            main_key: keys.main,
        })
    }
}

/// Event kinds routed to the publication sink.
fn allow_list(basics: &BasicManager, config: &AppConfig) -> AllowList {
    if !config.publish.enabled {
        return AllowList::empty();
    }
    match &config.publish.topics {
        Some(topics) => AllowList::new(topics.iter().map(String::as_str)),
        None => AllowList::new(basics.publishable_events()),
    }
}
