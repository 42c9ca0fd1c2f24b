//! Shared fixtures for the node-runtime integration tests.

#![allow(dead_code)]

use dx_01_auth::{Account, AuthGenesis, AuthParams};
use dx_02_bank::MsgSend;
use dx_04_staking::domain::msgs::TYPE_MSG_CREATE_VALIDATOR;
use dx_04_staking::MsgCreateValidator;
use node_runtime::{AppConfig, DexApp};
use shared_bus::{NoopSink, PubMsgSink};
use shared_store::{InMemoryKVStore, KeyValueStore};
use shared_types::{
    Address, Amount, AppState, BlockHeader, Msg, RequestBeginBlock, RequestEndBlock,
    RequestInitChain, RequestQuery, ResponseDeliverTx, ResponseEndBlock, Tx,
};
use std::sync::Arc;

pub const CHAIN_ID: &str = "dex-test";
pub const MIN_SELF: Amount = 10_000 * 100_000_000;
pub const INITIAL: Amount = 2 * MIN_SELF;
pub const FEE: Amount = 1_000_000;
pub const GAS: u64 = 10_000_000;
pub const VALIDATOR_KEY: &str = "0a0b0c0d";

pub fn alice() -> Address {
    Address::new([0xa1; 20])
}

pub fn bob() -> Address {
    Address::new([0xb0; 20])
}

pub fn config() -> AppConfig {
    AppConfig {
        chain_id: CHAIN_ID.to_string(),
        ..AppConfig::default()
    }
}

pub fn new_app(config: &AppConfig, db: Arc<dyn KeyValueStore>, sink: Arc<dyn PubMsgSink>) -> DexApp {
    DexApp::new(config, db, sink).unwrap()
}

pub fn memory_app() -> DexApp {
    new_app(&config(), Arc::new(InMemoryKVStore::new()), Arc::new(NoopSink))
}

/// Default genesis with alice funded.
pub fn genesis(app: &DexApp) -> AppState {
    let mut state = app.container().basics.default_genesis();
    let auth = AuthGenesis {
        params: AuthParams::default(),
        accounts: vec![Account::new(alice(), 0).with_balance(INITIAL)],
    };
    state.insert(dx_01_auth::MODULE_NAME, serde_json::to_value(auth).unwrap());
    state
}

pub fn init_with(app: &mut DexApp, state: &AppState) {
    app.init_chain(RequestInitChain {
        chain_id: CHAIN_ID.to_string(),
        time: 1_600_000_000,
        validators: Vec::new(),
        app_state_bytes: state.to_bytes().unwrap(),
    })
    .unwrap();
}

pub fn init(app: &mut DexApp) {
    let state = genesis(app);
    init_with(app, &state);
}

pub fn begin(app: &mut DexApp, height: u64) {
    app.begin_block(RequestBeginBlock {
        header: BlockHeader {
            chain_id: CHAIN_ID.to_string(),
            height,
            time: 1_600_000_000 + height * 5,
            ..Default::default()
        },
    })
    .unwrap();
}

/// BeginBlock, every tx, EndBlock and Commit.
pub fn block(app: &mut DexApp, txs: &[Vec<u8>]) -> (Vec<ResponseDeliverTx>, ResponseEndBlock) {
    let height = app.last_height().unwrap() + 1;
    begin(app, height);
    let results = txs.iter().map(|tx| app.deliver_tx(tx).unwrap()).collect();
    let end = app.end_block(RequestEndBlock { height }).unwrap();
    app.commit().unwrap();
    (results, end)
}

pub fn tx(signer: Address, sequence: u64, fee: Amount, msgs: Vec<Msg>) -> Vec<u8> {
    serde_json::to_vec(&Tx {
        msgs,
        fee,
        gas: GAS,
        signer,
        sequence,
        memo: String::new(),
    })
    .unwrap()
}

pub fn create_validator(operator: Address) -> Msg {
    Msg::new(
        dx_04_staking::STORE_KEY,
        TYPE_MSG_CREATE_VALIDATOR,
        &MsgCreateValidator {
            operator,
            pub_key: VALIDATOR_KEY.to_string(),
            moniker: "node0".to_string(),
            self_delegation: MIN_SELF,
        },
    )
    .unwrap()
}

pub fn send(from: Address, to: Address, amount: Amount) -> Msg {
    Msg::new(
        dx_02_bank::STORE_KEY,
        dx_02_bank::domain::msgs::TYPE_MSG_SEND,
        &MsgSend::new(from, to, amount),
    )
    .unwrap()
}

pub fn account(app: &DexApp, addr: &Address) -> Account {
    let res = app.query(&RequestQuery {
        path: format!("custom/{}/account/{}", dx_01_auth::QUERIER_ROUTE, addr.to_hex()),
        data: Vec::new(),
    });
    assert!(res.is_ok(), "account query failed: {}", res.log);
    serde_json::from_slice(&res.value).unwrap()
}
