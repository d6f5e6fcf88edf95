//! Fixtures shared by unit tests.

use crate::domain::{
    merkle_root, Block, BlockHeader, Chain, ChainConfig, ConsensusExtension, Round, Transaction,
};
use crate::ports::TimeSource;
use ed25519_dalek::{Signer, SigningKey};
use shared_types::{ChainId, Hash, PublicKey, ZERO_HASH};
use std::sync::atomic::{AtomicU64, Ordering};

pub const PRODUCERS: usize = 4;
pub const PACKING_INTERVAL: u64 = 10;
pub const BASE_TIME: u64 = 1_700_000_000;

pub fn chain_id(id: u32) -> ChainId {
    ChainId::new(id).unwrap()
}

pub fn create_chain(id: u32, window_size: usize) -> Chain {
    Chain::new(ChainConfig::new(chain_id(id)).with_window_size(window_size))
}

/// Clock pinned to a settable instant.
pub struct FixedTimeSource(AtomicU64);

impl FixedTimeSource {
    pub fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builds signed blocks on a fixed producer schedule.
///
/// Height `h` falls in round `(h - 1) / 4 + 1`, slot `(h - 1) % 4 + 1`.
pub struct BlockFactory {
    keys: Vec<SigningKey>,
    base_time: u64,
}

impl BlockFactory {
    pub fn new() -> Self {
        Self::with_base_time(BASE_TIME)
    }

    pub fn with_base_time(base_time: u64) -> Self {
        let keys = (1..=PRODUCERS as u8)
            .map(|seed| SigningKey::from_bytes(&[seed; 32]))
            .collect();
        Self { keys, base_time }
    }

    pub fn members(&self) -> Vec<PublicKey> {
        self.keys.iter().map(|k| k.verifying_key().to_bytes()).collect()
    }

    pub fn round_index(height: u64) -> u64 {
        height.saturating_sub(1) / PRODUCERS as u64 + 1
    }

    pub fn slot(height: u64) -> u32 {
        (height.saturating_sub(1) % PRODUCERS as u64) as u32 + 1
    }

    pub fn round(&self, index: u64) -> Round {
        let start = self.base_time + (index - 1) * PRODUCERS as u64 * PACKING_INTERVAL;
        Round::new(index, start, PACKING_INTERVAL, self.members())
    }

    pub fn timestamp(&self, height: u64) -> u64 {
        let round = self.round(Self::round_index(height));
        round.start_time + u64::from(Self::slot(height)) * PACKING_INTERVAL
    }

    /// Install every round needed for heights `1..=up_to`.
    pub async fn install_rounds(&self, chain: &Chain, up_to: u64) {
        for index in 1..=Self::round_index(up_to) {
            chain.install_round(self.round(index)).await;
        }
    }

    fn key_for(&self, height: u64) -> &SigningKey {
        &self.keys[Self::slot(height) as usize - 1]
    }

    /// Re-seal and re-sign with the key scheduled for the header's height.
    pub fn sign(&self, header: BlockHeader) -> BlockHeader {
        self.sign_with(header.clone(), self.key_for(header.height))
    }

    pub fn sign_with(&self, header: BlockHeader, key: &SigningKey) -> BlockHeader {
        let mut header = header.seal();
        header.signature = key.sign(&header.signing_message()).to_bytes().to_vec();
        header
    }

    pub fn block(&self, height: u64, previous_hash: Hash, transactions: Vec<Transaction>) -> Block {
        let round = self.round(Self::round_index(height));
        let tx_hashes: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
        let header = BlockHeader {
            height,
            previous_hash,
            hash: ZERO_HASH,
            timestamp: self.timestamp(height),
            producer: self.key_for(height).verifying_key().to_bytes(),
            signature: vec![],
            extension: ConsensusExtension {
                tx_root: merkle_root(&tx_hashes),
                tx_count: transactions.len() as u32,
                round_index: round.index,
                round_start_time: round.start_time,
                packing_index: Self::slot(height),
                extend: vec![],
            },
        };
        Block {
            header: self.sign(header),
            transactions,
        }
    }

    pub fn header(&self, height: u64, previous_hash: Hash) -> BlockHeader {
        self.block(height, previous_hash, vec![]).header
    }

    /// `count` linked headers starting at `start`.
    pub fn headers(&self, start: u64, count: u64, previous_hash: Hash) -> Vec<BlockHeader> {
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

pub fn create_transaction(seed: u8) -> Transaction {
    Transaction {
        tx_type: 2,
        timestamp: BASE_TIME + u64::from(seed),
        payload: vec![seed; 16],
    }
}
