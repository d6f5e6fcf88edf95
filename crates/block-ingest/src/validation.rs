//! Block validation pipeline
//!
//! Short-circuits on the first failure, in order: structure, continuity,
//! timestamps, producer eligibility, signature, transactions. Only the
//! transaction step awaits, and it honours the caller's cancellation token.

use crate::domain::{
    merkle_root, Block, BlockHeader, Chain, ChainConfig, ChainState, ConsensusError,
    ConsensusResult,
};
use crate::metrics;
use crate::ports::{SignatureVerifier, SystemTimeSource, TimeSource, TransactionVerifier};
use shared_types::ChainId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Trust mode of a candidate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Historical catch-up: no wall-clock check, old heights are already processed.
    Download,
    /// Freshly propagated: wall-clock drift enforced.
    Live,
}

impl ValidationMode {
    /// Map the boundary flag (`0` download, `1` live).
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(ValidationMode::Download),
            1 => Some(ValidationMode::Live),
            _ => None,
        }
    }
}

pub struct BlockValidator<S, T> {
    sig_verifier: Arc<S>,
    tx_verifier: Arc<T>,
    time_source: Arc<dyn TimeSource>,
}

impl<S, T> BlockValidator<S, T>
where
    S: SignatureVerifier,
    T: TransactionVerifier,
{
    pub fn new(sig_verifier: Arc<S>, tx_verifier: Arc<T>) -> Self {
        Self {
            sig_verifier,
            tx_verifier,
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Validate `block` against `chain` under a shared lease.
    pub async fn validate(
        &self,
        mode: ValidationMode,
        chain: &Chain,
        block: &Block,
        cancel: &CancellationToken,
    ) -> ConsensusResult<()> {
        let state = chain.read().await;
        self.validate_locked(mode, chain, &state, block, cancel).await
    }

    /// Validate against a state the caller already holds a lease on.
    pub async fn validate_locked(
        &self,
        mode: ValidationMode,
        chain: &Chain,
        state: &ChainState,
        block: &Block,
        cancel: &CancellationToken,
    ) -> ConsensusResult<()> {
        let started = Instant::now();
        let header = &block.header;
        let result = self.run_pipeline(mode, chain, state, block, cancel).await;
        metrics::record_validation_latency(started.elapsed().as_secs_f64());
        match &result {
            Ok(()) => tracing::debug!(
                parent: chain.loggers().consensus(),
                height = header.height,
                ?mode,
                "Block passed validation"
            ),
            Err(e) => {
                metrics::record_block_rejected(e.code().as_str());
                tracing::warn!(
                    parent: chain.loggers().consensus(),
                    height = header.height,
                    ?mode,
                    error = %e,
                    "Block failed validation"
                );
            }
        }
        result
    }

    async fn run_pipeline(
        &self,
        mode: ValidationMode,
        chain: &Chain,
        state: &ChainState,
        block: &Block,
        cancel: &CancellationToken,
    ) -> ConsensusResult<()> {
        let config = chain.config();
        let header = &block.header;
        validate_structure(block, config)?;
        validate_continuity(mode, header, state)?;
        validate_timestamp(mode, header, state, self.time_source.now(), config)?;
        validate_producer(header, state)?;
        self.validate_signature(header)?;
        self.validate_transactions(chain.id(), state.tip_height(), block, cancel)
            .await
    }

    fn validate_signature(&self, header: &BlockHeader) -> ConsensusResult<()> {
        if self
            .sig_verifier
            .verify(&header.signing_message(), &header.signature, &header.producer)
        {
            Ok(())
        } else {
            Err(ConsensusError::InvalidSignature)
        }
    }

    async fn validate_transactions(
        &self,
        chain_id: ChainId,
        tip_height: Option<u64>,
        block: &Block,
        cancel: &CancellationToken,
    ) -> ConsensusResult<()> {
        for (index, tx) in block.transactions.iter().enumerate() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return Err(ConsensusError::Cancelled),
                result = self.tx_verifier.verify(chain_id, tip_height, tx) => {
                    result.map_err(|reason| ConsensusError::TransactionRejected { index, reason })?;
                }
            }
        }
        if cancel.is_cancelled() {
            return Err(ConsensusError::Cancelled);
        }
        Ok(())
    }
}

/// Hash, transaction list shape and transaction root.
pub fn validate_structure(block: &Block, config: &ChainConfig) -> ConsensusResult<()> {
    let header = &block.header;
    let computed = header.compute_hash();
    if computed != header.hash {
        return Err(ConsensusError::HashMismatch {
            declared: hex::encode(header.hash),
            computed: hex::encode(computed),
        });
    }

    let count = block.transactions.len();
    if count > config.max_txs_per_block {
        return Err(ConsensusError::TooManyTransactions {
            count,
            limit: config.max_txs_per_block,
        });
    }
    if usize::try_from(header.extension.tx_count).ok() != Some(count) {
        return Err(ConsensusError::TxCountMismatch {
            declared: header.extension.tx_count,
            actual: count,
        });
    }

    let tx_hashes = block.tx_hashes();
    let mut seen = HashSet::with_capacity(tx_hashes.len());
    for (index, hash) in tx_hashes.iter().enumerate() {
        if !seen.insert(hash) {
            return Err(ConsensusError::DuplicateTransaction { index });
        }
    }

    if merkle_root(&tx_hashes) != header.extension.tx_root {
        return Err(ConsensusError::TxRootMismatch);
    }
    Ok(())
}

/// Height and previous-hash link to the tip.
pub fn validate_continuity(
    mode: ValidationMode,
    header: &BlockHeader,
    state: &ChainState,
) -> ConsensusResult<()> {
    let Some(tip) = state.tip() else {
        return Ok(());
    };

    if mode == ValidationMode::Download && header.height <= tip.height {
        return Err(ConsensusError::AlreadyProcessed {
            height: header.height,
            tip: tip.height,
        });
    }

    let expected = tip.height.saturating_add(1);
    if header.height != expected {
        return Err(ConsensusError::Discontinuity {
            expected_height: expected,
            actual_height: header.height,
        });
    }
    if header.previous_hash != tip.hash {
        return Err(ConsensusError::PreviousHashMismatch {
            height: header.height,
        });
    }
    Ok(())
}

/// Ordering against the tip, plus wall-clock drift in live mode.
pub fn validate_timestamp(
    mode: ValidationMode,
    header: &BlockHeader,
    state: &ChainState,
    now: u64,
    config: &ChainConfig,
) -> ConsensusResult<()> {
    if let Some(tip) = state.tip() {
        if header.timestamp <= tip.timestamp {
            return Err(ConsensusError::TimestampNotAfterTip {
                timestamp: header.timestamp,
                tip_timestamp: tip.timestamp,
            });
        }
    }

    if mode == ValidationMode::Live && header.timestamp.abs_diff(now) > config.max_timestamp_drift_secs
    {
        return Err(ConsensusError::ClockDrift {
            timestamp: header.timestamp,
            now,
            bound: config.max_timestamp_drift_secs,
        });
    }
    Ok(())
}

/// Round membership, slot and slot time.
pub fn validate_producer(header: &BlockHeader, state: &ChainState) -> ConsensusResult<()> {
    let ext = &header.extension;
    let round = state
        .rounds()
        .get(ext.round_index)
        .ok_or(ConsensusError::UnknownRound(ext.round_index))?;

    let slot = round
        .slot_of(&header.producer)
        .ok_or(ConsensusError::ProducerNotInRound {
            round_index: ext.round_index,
        })?;
    if slot != ext.packing_index {
        return Err(ConsensusError::WrongSlot {
            expected: slot,
            actual: ext.packing_index,
        });
    }

    let expected = round.slot_time(slot).unwrap_or(u64::MAX);
    if ext.round_start_time != round.start_time || header.timestamp != expected {
        return Err(ConsensusError::SlotTimeMismatch {
            expected,
            actual: header.timestamp,
        });
    }
    Ok(())
}
