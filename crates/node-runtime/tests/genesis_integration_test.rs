//! Genesis import, export and application assembly.

mod common;

use common::*;
use node_runtime::container::{AppContainer, BEGIN_BLOCKERS, END_BLOCKERS, INIT_GENESIS};
use node_runtime::{AppError, LifecycleState, Phase};
use shared_bus::NoopSink;
use shared_store::{CommitMultiStore, InMemoryKVStore};
use shared_types::{AllowList, BlockHeader, Context, RequestInitChain, ValidatorUpdate};
use std::sync::Arc;

fn fresh_init(app_state_bytes: Vec<u8>, validators: Vec<ValidatorUpdate>) -> RequestInitChain {
    RequestInitChain {
        chain_id: CHAIN_ID.to_string(),
        time: 1_600_000_000,
        validators,
        app_state_bytes,
    }
}

#[test]
fn test_export_import_is_a_fixed_point() {
    let mut app = memory_app();
    init(&mut app);
    block(&mut app, &[tx(alice(), 0, FEE, vec![create_validator(alice())])]);
    block(&mut app, &[tx(alice(), 1, FEE, vec![send(alice(), bob(), 500_000_000)])]);
    let exported = app.export_app_state_and_validators().unwrap();
    let bytes = exported.app_state.to_bytes().unwrap();

    let mut imported = memory_app();
    let res = imported
        .init_chain(fresh_init(bytes.clone(), exported.validators.clone()))
        .unwrap();
    assert_eq!(res.validators, exported.validators);

    let reexported = imported.export_app_state_and_validators().unwrap();
    assert_eq!(reexported.app_state.to_bytes().unwrap(), bytes);
    assert_eq!(reexported.validators, exported.validators);
    assert_eq!(account(&imported, &alice()), account(&app, &alice()));
}

#[test]
fn test_consensus_validator_mismatch_is_rejected() {
    let mut app = memory_app();
    let state = genesis(&app);
    let err = app
        .init_chain(fresh_init(
            state.to_bytes().unwrap(),
            vec![ValidatorUpdate::new("ffff", 1)],
        ))
        .unwrap_err();
    assert!(matches!(err, AppError::ValidatorMismatch { .. }));
    assert_eq!(app.state(), LifecycleState::Uninitialized);
    assert_eq!(app.last_height(), None);
}

#[test]
fn test_invalid_genesis_writes_nothing() {
    let mut app = memory_app();
    let mut state = genesis(&app);
    state.insert(
        dx_02_bank::MODULE_NAME,
        serde_json::json!({"params": {"activation_fee": -1, "lock_coins_fee": 0, "send_enabled": true}}),
    );

    let err = app.init_chain(fresh_init(state.to_bytes().unwrap(), Vec::new())).unwrap_err();
    assert!(matches!(err, AppError::Genesis(_)));
    assert_eq!(app.state(), LifecycleState::Uninitialized);
    assert_eq!(app.last_height(), None);

    let err = app.init_chain(fresh_init(b"{not json".to_vec(), Vec::new())).unwrap_err();
    assert!(matches!(err, AppError::AppStateDecode(_)));

    // The app is still usable once a valid genesis arrives.
    init(&mut app);
    assert_eq!(app.state(), LifecycleState::ChainInitialized);
    assert_eq!(app.last_height(), Some(0));
}

#[test]
fn test_empty_app_state_uses_module_defaults() {
    let mut app = memory_app();
    let res = app.init_chain(fresh_init(Vec::new(), Vec::new())).unwrap();
    assert!(res.validators.is_empty());

    let exported = app.export_genesis().unwrap();
    assert_eq!(exported.len(), app.container().manager.len());
    block(&mut app, &[]);
    assert_eq!(app.last_height(), Some(1));
}

#[test]
fn test_phase_orders_follow_the_container_tables() {
    let app = memory_app();
    let manager = &app.container().manager;
    assert_eq!(manager.phase_names(Phase::BeginBlock), &BEGIN_BLOCKERS);
    assert_eq!(manager.phase_names(Phase::EndBlock), &END_BLOCKERS);
    assert_eq!(manager.phase_names(Phase::InitGenesis), &INIT_GENESIS);
    assert_eq!(manager.phase_names(Phase::ExportGenesis), &INIT_GENESIS);
}

#[test]
fn test_only_permitted_modules_mint() {
    let mut store = CommitMultiStore::new(Arc::new(InMemoryKVStore::new()));
    let container = AppContainer::build(&mut store, &config()).unwrap();
    let mut cache = store.cache_wrap();
    let mut ctx = Context::new(&mut cache, BlockHeader::default(), Arc::new(AllowList::empty()));

    let supply = &container.keepers.supply;
    assert!(supply.mint_coins(&mut ctx, dx_04_staking::BONDED_POOL, 1).is_err());
    assert!(supply.mint_coins(&mut ctx, dx_01_auth::FEE_COLLECTOR, 1).is_err());
    assert_eq!(supply.total_supply(&ctx).unwrap(), 0);
}

#[test]
fn test_queries_survive_a_halt() {
    let mut app = new_app(&config(), Arc::new(InMemoryKVStore::new()), Arc::new(NoopSink));
    init(&mut app);
    block(&mut app, &[]);
    app.halt("operator requested".to_string());

    assert_eq!(account(&app, &alice()).balance, INITIAL);
    assert!(app.export_genesis().is_ok());
    assert!(matches!(
        app.init_chain(fresh_init(Vec::new(), Vec::new())),
        Err(AppError::Halted(ref reason)) if reason == "operator requested"
    ));
}
