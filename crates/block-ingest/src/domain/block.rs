//! Block domain entities
//!
//! Headers are immutable once built: [`BlockHeader::seal`] fixes the declared
//! hash from the canonical preimage, and nothing mutates a header afterwards.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Hash, PublicKey, ZERO_HASH};

use super::codec;
use super::wire::WireEncode;

/// Double SHA-256 of `data`.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Consensus fields carried after the signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusExtension {
    /// Merkle root over the block's transaction hashes.
    pub tx_root: Hash,
    pub tx_count: u32,
    pub round_index: u64,
    pub round_start_time: u64,
    /// 1-based slot of the producer within its round.
    pub packing_index: u32,
    /// Opaque protocol extension bytes.
    pub extend: Vec<u8>,
}

/// Block header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    pub previous_hash: Hash,
    /// Declared digest; valid only if it equals [`BlockHeader::compute_hash`].
    pub hash: Hash,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub producer: PublicKey,
    pub signature: Vec<u8>,
    pub extension: ConsensusExtension,
}

impl BlockHeader {
    /// Recompute the digest over the canonical preimage.
    pub fn compute_hash(&self) -> Hash {
        double_sha256(&codec::header_preimage(self))
    }

    /// Whether the declared hash matches the recomputed one.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Fix the declared hash from the current contents.
    #[must_use]
    pub fn seal(mut self) -> Self {
        self.hash = self.compute_hash();
        self
    }

    /// The message a producer signs.
    pub fn signing_message(&self) -> Hash {
        self.hash
    }
}

/// A transaction as carried inside a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_type: u16,
    pub timestamp: u64,
    pub payload: Vec<u8>,
}

impl Transaction {
    pub fn hash(&self) -> Hash {
        double_sha256(&self.to_bytes())
    }
}

/// A block received from the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// The block hash is the header hash.
    pub fn hash(&self) -> Hash {
        self.header.hash
    }

    pub fn tx_hashes(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::hash).collect()
    }
}

/// Merkle root over `leaves`.
///
/// Pairs are hashed with double SHA-256; an odd level pairs its last node
/// with itself. An empty list yields the zero hash.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return ZERO_HASH;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&left);
                buf[32..].copy_from_slice(&right);
                double_sha256(&buf)
            })
            .collect();
    }
    level[0]
}
