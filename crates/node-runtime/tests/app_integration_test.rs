//! End-to-end lifecycle tests: blocks, transactions, publication, halting
//! and restart against a shared store.

mod common;

use common::*;
use dx_03_supply::SupplyKeeper;
use node_runtime::{AppConfig, AppError, LifecycleState, Phase};
use shared_bus::{NoopSink, RecordingSink};
use shared_store::{InMemoryKVStore, KeyValueStore};
use shared_types::{
    AppState, RequestEndBlock, RequestQuery, ResponseDeliverTx, ValidatorUpdate,
};
use std::sync::Arc;

fn event_kinds(res: &ResponseDeliverTx) -> Vec<&str> {
    res.events.iter().map(|e| e.kind.as_str()).collect()
}

#[test]
fn test_create_validator_joins_the_set_at_end_block() {
    let sink = Arc::new(RecordingSink::new());
    let mut app = new_app(&config(), Arc::new(InMemoryKVStore::new()), sink.clone());
    init(&mut app);

    begin(&mut app, 1);
    let res = app
        .deliver_tx(&tx(alice(), 0, FEE, vec![create_validator(alice())]))
        .unwrap();
    assert!(res.is_ok(), "create validator failed: {}", res.log);
    assert_eq!(res.gas_wanted, GAS);
    assert!(res.gas_used > 0);
    // Publishable events wait in the pipeline instead of the response.
    assert!(!event_kinds(&res).contains(&"create_validator"));

    let end = app.end_block(RequestEndBlock { height: 1 }).unwrap();
    assert_eq!(end.validator_updates, vec![ValidatorUpdate::new(VALIDATOR_KEY, 10_000)]);

    // Nothing leaves the pipeline before the block is durable.
    assert!(sink.is_empty());
    app.commit().unwrap();
    assert_eq!(sink.topics(), vec!["create_validator".to_string()]);

    let alice_account = account(&app, &alice());
    assert_eq!(alice_account.balance, INITIAL - MIN_SELF - FEE);
    assert_eq!(alice_account.sequence, 1);

    let exported = app.export_app_state_and_validators().unwrap();
    assert_eq!(exported.height, 1);
    assert_eq!(exported.validators, vec![ValidatorUpdate::new(VALIDATOR_KEY, 10_000)]);
    let staking: dx_04_staking::StakingGenesis =
        serde_json::from_value(exported.app_state.get("staking").unwrap().clone()).unwrap();
    assert_eq!(staking.validators.len(), 1);
    assert_eq!(staking.validators[0].power(), 10_000);
}

#[test]
fn test_failed_tx_is_all_or_nothing() {
    let sink = Arc::new(RecordingSink::new());
    let mut app = new_app(&config(), Arc::new(InMemoryKVStore::new()), sink.clone());
    init(&mut app);

    begin(&mut app, 1);
    let first = app
        .deliver_tx(&tx(alice(), 0, FEE, vec![send(alice(), bob(), 500_000_000)]))
        .unwrap();
    assert!(first.is_ok(), "send failed: {}", first.log);

    // The second message fails, so the first one and the fee are undone.
    let second = app
        .deliver_tx(&tx(
            alice(),
            1,
            FEE,
            vec![send(alice(), bob(), 100_000_000), send(alice(), bob(), 0)],
        ))
        .unwrap();
    assert!(!second.is_ok());
    assert_eq!(second.codespace, dx_02_bank::CODESPACE);
    let kinds = event_kinds(&second);
    assert!(kinds.contains(&"transfer"));
    assert!(!kinds.contains(&"send_coins"));

    app.end_block(RequestEndBlock { height: 1 }).unwrap();
    assert!(sink.is_empty());
    app.commit().unwrap();
    assert_eq!(sink.topics(), vec!["send_coins".to_string()]);

    let alice_account = account(&app, &alice());
    assert_eq!(alice_account.sequence, 1);
    assert_eq!(alice_account.balance, INITIAL - FEE - 500_000_000);
    // Bob's account was created by the first send, less the activation fee.
    assert_eq!(account(&app, &bob()).balance, 400_000_000);
}

#[test]
fn test_ante_rejections_leave_no_trace() {
    let mut app = memory_app();
    init(&mut app);

    begin(&mut app, 1);
    let wrong_sequence = app
        .deliver_tx(&tx(alice(), 7, FEE, vec![send(alice(), bob(), 500_000_000)]))
        .unwrap();
    assert!(!wrong_sequence.is_ok());

    let unknown_signer = app
        .deliver_tx(&tx(bob(), 0, FEE, vec![send(bob(), alice(), 500_000_000)]))
        .unwrap();
    assert!(!unknown_signer.is_ok());

    let garbage = app.deliver_tx(b"not a transaction").unwrap();
    assert!(!garbage.is_ok());
    assert_eq!(app.state(), LifecycleState::TxPending);

    app.end_block(RequestEndBlock { height: 1 }).unwrap();
    app.commit().unwrap();

    let alice_account = account(&app, &alice());
    assert_eq!(alice_account.sequence, 0);
    assert_eq!(alice_account.balance, INITIAL);
}

#[test]
fn test_broken_invariant_halts_on_cadence() {
    let config = AppConfig {
        inv_check_period: 2,
        ..config()
    };
    let sink = Arc::new(RecordingSink::new());
    let mut app = new_app(&config, Arc::new(InMemoryKVStore::new()), sink.clone());
    let mut state = genesis(&app);
    state.insert("supply", serde_json::json!({"supply": "1"}));
    init_with(&mut app, &state);

    // Height 1 is off cadence, so the wrong supply goes unnoticed.
    block(&mut app, &[]);

    begin(&mut app, 2);
    app.deliver_tx(&tx(alice(), 0, FEE, vec![send(alice(), bob(), 500_000_000)]))
        .unwrap();
    let err = app.end_block(RequestEndBlock { height: 2 }).unwrap_err();
    assert!(matches!(err, AppError::Module(ref e) if e.fatal));
    assert!(app.is_halted());
    assert!(app.halt_reason().unwrap().contains("end block 2"));

    assert!(matches!(app.commit(), Err(AppError::Halted(_))));
    assert!(sink.is_empty());
    assert_eq!(app.last_height(), Some(1));
}

#[test]
fn test_invariants_see_the_state_each_block_commits() {
    let config = AppConfig {
        inv_check_period: 1,
        ..config()
    };
    let mut app = new_app(&config, Arc::new(InMemoryKVStore::new()), Arc::new(NoopSink));
    init(&mut app);
    assert_eq!(
        app.container().manager.phase_names(Phase::EndBlock).last(),
        Some(&dx_06_crisis::MODULE_NAME)
    );

    // Staking moves the self-delegation into the bonded pool during EndBlock;
    // the check that follows runs on exactly that state.
    let (results, end) = block(&mut app, &[tx(alice(), 0, FEE, vec![create_validator(alice())])]);
    assert!(results[0].is_ok(), "create validator failed: {}", results[0].log);
    assert_eq!(end.validator_updates.len(), 1);
    block(&mut app, &[]);

    assert!(!app.is_halted());
    assert_eq!(app.last_height(), Some(2));
    let bonded = account(&app, &SupplyKeeper::module_address(dx_04_staking::BONDED_POOL));
    assert_eq!(bonded.balance, MIN_SELF);
}

#[test]
fn test_disabled_cadence_never_checks() {
    let mut app = memory_app();
    let mut state = genesis(&app);
    state.insert("supply", serde_json::json!({"supply": "1"}));
    init_with(&mut app, &state);

    for _ in 0..3 {
        block(&mut app, &[]);
    }
    assert_eq!(app.last_height(), Some(3));
    assert!(!app.is_halted());
}

#[test]
fn test_restart_resumes_from_the_store() {
    let db: Arc<dyn KeyValueStore> = Arc::new(InMemoryKVStore::new());
    let (digest, exported) = {
        let mut app = new_app(&config(), Arc::clone(&db), Arc::new(NoopSink));
        init(&mut app);
        block(&mut app, &[tx(alice(), 0, FEE, vec![send(alice(), bob(), 500_000_000)])]);
        block(&mut app, &[]);
        let digest = app.query(&RequestQuery {
            path: "app/digest".to_string(),
            data: Vec::new(),
        });
        (digest.value, app.export_genesis().unwrap())
    };

    // A different configured chain id must not override the stored one.
    let other = AppConfig {
        chain_id: "other-chain".to_string(),
        ..config()
    };
    let mut app = new_app(&other, db, Arc::new(NoopSink));
    assert_eq!(app.state(), LifecycleState::Committed);
    assert_eq!(app.last_height(), Some(2));
    assert_eq!(app.chain_id(), CHAIN_ID);
    let resumed = app.query(&RequestQuery {
        path: "app/digest".to_string(),
        data: Vec::new(),
    });
    assert_eq!(resumed.value, digest);
    assert_eq!(app.export_genesis().unwrap(), exported);

    block(&mut app, &[tx(alice(), 1, FEE, vec![send(alice(), bob(), 100_000_000)])]);
    assert_eq!(app.last_height(), Some(3));
    assert_eq!(account(&app, &alice()).sequence, 2);
}

#[test]
fn test_lifecycle_calls_out_of_order_are_rejected() {
    let mut app = memory_app();
    assert!(matches!(
        app.deliver_tx(b"{}"),
        Err(AppError::InvalidState { call: "DeliverTx", .. })
    ));

    init(&mut app);
    let again = app.init_chain(shared_types::RequestInitChain {
        chain_id: CHAIN_ID.to_string(),
        time: 0,
        validators: Vec::new(),
        app_state_bytes: AppState::new().to_bytes().unwrap(),
    });
    assert!(matches!(again, Err(AppError::InvalidState { call: "InitChain", .. })));

    assert!(matches!(app.commit(), Err(AppError::InvalidState { call: "Commit", .. })));
    begin(&mut app, 1);
    assert!(matches!(
        app.end_block(RequestEndBlock { height: 2 }),
        Err(AppError::HeightMismatch { open: 1, got: 2 })
    ));
    assert_eq!(app.state(), LifecycleState::BlockOpen);
}

#[cfg(feature = "rocksdb")]
#[test]
fn test_restart_on_rocksdb() {
    use shared_store::RocksDbStore;

    let dir = tempfile::tempdir().unwrap();
    let exported = {
        let db: Arc<dyn KeyValueStore> = Arc::new(RocksDbStore::open_default(dir.path()).unwrap());
        let mut app = new_app(&config(), db, Arc::new(NoopSink));
        init(&mut app);
        block(&mut app, &[tx(alice(), 0, FEE, vec![send(alice(), bob(), 500_000_000)])]);
        app.export_genesis().unwrap()
    };

    let db: Arc<dyn KeyValueStore> = Arc::new(RocksDbStore::open_default(dir.path()).unwrap());
    let app = new_app(&config(), db, Arc::new(NoopSink));
    assert_eq!(app.last_height(), Some(1));
    assert_eq!(app.export_genesis().unwrap(), exported);
}
