//! Shared harness for the integration tests.

#![allow(dead_code)]

use block_ingest::domain::merkle_root;
use block_ingest::{
    encode_block, encode_header, AcceptAllTransactions, Block, BlockHeader, BlockService,
    BlockServiceApi, ChainConfig, ChainRegistry, ConsensusExtension, Ed25519SignatureVerifier,
    InMemoryChainStore, InMemoryEventBus, IngestDependencies, Round, RpcParams, TimeSource,
    Transaction,
};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use shared_types::{ChainId, Hash, PublicKey, ResponseEnvelope, ZERO_HASH};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const PRODUCERS: u64 = 3;
pub const INTERVAL: u64 = 5;
pub const GENESIS_TIME: u64 = 1_650_000_000;

pub type Service =
    BlockService<InMemoryEventBus, InMemoryChainStore, Ed25519SignatureVerifier, AcceptAllTransactions>;

pub struct Clock(AtomicU64);

impl Clock {
    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl TimeSource for Clock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deterministic producers rotating through rounds of `PRODUCERS` slots.
pub struct Producers {
    keys: Vec<SigningKey>,
}

impl Producers {
    pub fn new() -> Self {
        let keys = (0..PRODUCERS as u8)
            .map(|i| SigningKey::from_bytes(&[0x40 + i; 32]))
            .collect();
        Self { keys }
    }

    fn members(&self) -> Vec<PublicKey> {
        self.keys.iter().map(|k| k.verifying_key().to_bytes()).collect()
    }

    fn round_of(height: u64) -> u64 {
        height.saturating_sub(1) / PRODUCERS + 1
    }

    fn slot_of(height: u64) -> u32 {
        (height.saturating_sub(1) % PRODUCERS) as u32 + 1
    }

    pub fn round(&self, index: u64) -> Round {
        let start = GENESIS_TIME + (index - 1) * PRODUCERS * INTERVAL;
        Round::new(index, start, INTERVAL, self.members())
    }

    pub fn timestamp(&self, height: u64) -> u64 {
        self.round(Self::round_of(height)).start_time + u64::from(Self::slot_of(height)) * INTERVAL
    }

    pub fn rounds_through(&self, height: u64) -> Vec<Round> {
        (1..=Self::round_of(height)).map(|i| self.round(i)).collect()
    }

    pub fn block(&self, height: u64, previous_hash: Hash, transactions: Vec<Transaction>) -> Block {
        self.block_with_extend(height, previous_hash, transactions, vec![])
    }

    /// Same slot and timestamp as [`Self::block`]; `extend` makes the hash distinct.
    pub fn block_with_extend(
        &self,
        height: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        extend: Vec<u8>,
    ) -> Block {
        let round = self.round(Self::round_of(height));
        let key = &self.keys[Self::slot_of(height) as usize - 1];
        let tx_hashes: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
        let mut header = BlockHeader {
            height,
            previous_hash,
            hash: ZERO_HASH,
            timestamp: self.timestamp(height),
            producer: key.verifying_key().to_bytes(),
            signature: vec![],
            extension: ConsensusExtension {
                tx_root: merkle_root(&tx_hashes),
                tx_count: transactions.len() as u32,
                round_index: round.index,
                round_start_time: round.start_time,
                packing_index: Self::slot_of(height),
                extend,
            },
        }
        .seal();
        header.signature = key.sign(&header.signing_message()).to_bytes().to_vec();
        Block {
            header,
            transactions,
        }
    }

    pub fn header(&self, height: u64, previous_hash: Hash) -> BlockHeader {
        self.block(height, previous_hash, vec![]).header
    }

    pub fn chain(&self, start: u64, count: u64, previous_hash: Hash) -> Vec<BlockHeader> {
        let mut previous = previous_hash;
        (start..start + count)
            .map(|height| {
                let header = self.header(height, previous);
                previous = header.hash;
                header
            })
            .collect()
    }
}

pub fn transaction(seed: u8) -> Transaction {
    Transaction {
        tx_type: 1,
        timestamp: GENESIS_TIME + u64::from(seed),
        payload: vec![seed; 8],
    }
}

pub fn chain_id(id: u32) -> ChainId {
    ChainId::new(id).unwrap()
}

pub struct Node {
    pub service: Arc<Service>,
    pub bus: Arc<InMemoryEventBus>,
    pub store: Arc<InMemoryChainStore>,
    pub clock: Arc<Clock>,
    pub producers: Producers,
}

impl Node {
    pub fn new() -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let store = Arc::new(InMemoryChainStore::new());
        let clock = Arc::new(Clock(AtomicU64::new(GENESIS_TIME)));
        let service = BlockService::new(IngestDependencies {
            registry: Arc::new(ChainRegistry::new()),
            event_bus: Arc::clone(&bus),
            store: Arc::clone(&store),
            sig_verifier: Arc::new(Ed25519SignatureVerifier),
            tx_verifier: Arc::new(AcceptAllTransactions),
        })
        .with_time_source(clock.clone());
        Self {
            service: Arc::new(service),
            bus,
            store,
            clock,
            producers: Producers::new(),
        }
    }

    /// Register chain `id` with window `window` and rounds for heights up to 64.
    pub async fn with_chain(self, id: u32, window: usize) -> Self {
        self.service
            .register_chain(ChainConfig::new(chain_id(id)).with_window_size(window))
            .unwrap();
        for round in self.producers.rounds_through(64) {
            self.service.install_round(chain_id(id), round).await.unwrap();
        }
        self
    }

    pub async fn call(&self, method: &str, params: Value) -> ResponseEnvelope {
        let params: RpcParams = match params {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        };
        self.service.dispatch(method, &params).await
    }

    pub async fn add_block(&self, id: u32, header: &BlockHeader) -> ResponseEnvelope {
        self.call(
            "addBlock",
            json!({"chainId": id, "blockHeader": hex::encode(encode_header(header))}),
        )
        .await
    }

    pub async fn roll_back(&self, id: u32, height: u64) -> ResponseEnvelope {
        self.call("chainRollBack", json!({"chainId": id, "height": height}))
            .await
    }

    pub async fn receive_headers(&self, id: u32, headers: &[BlockHeader]) -> ResponseEnvelope {
        let list: Vec<String> = headers
            .iter()
            .map(|h| hex::encode(encode_header(h)))
            .collect();
        self.call("receiveHeaderList", json!({"chainId": id, "headerList": list}))
            .await
    }

    pub async fn valid_block(&self, id: u32, block: &Block, download: i64) -> ResponseEnvelope {
        self.call(
            "validBlock",
            json!({"chainId": id, "block": hex::encode(encode_block(block)), "download": download}),
        )
        .await
    }

    pub async fn heights(&self, id: u32) -> Vec<u64> {
        self.service
            .header_range(chain_id(id), 0, u64::MAX)
            .await
            .unwrap()
            .iter()
            .map(|h| h.height)
            .collect()
    }
}

pub fn value_true() -> ResponseEnvelope {
    ResponseEnvelope::success_value()
}
