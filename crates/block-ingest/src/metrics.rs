//! # Ingestion Metrics
//!
//! Prometheus metrics for block ingestion.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! block-ingest = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `ingest_blocks_added_total` - Counter of headers appended after the tip
//! - `ingest_blocks_rejected_total` - Counter of rejected blocks (by error code)
//! - `ingest_headers_prepended_total` - Counter of historical headers spliced in
//! - `ingest_rollbacks_total` - Counter of rollbacks that removed headers
//! - `ingest_validation_latency_seconds` - Histogram of validation times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BLOCKS_ADDED: IntCounter = register_int_counter!(
        "ingest_blocks_added_total",
        "Total number of headers appended after the tip"
    )
    .expect("Failed to create BLOCKS_ADDED metric");

    /// Total blocks rejected, labeled by error code
    pub static ref BLOCKS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "ingest_blocks_rejected_total",
        "Total number of blocks rejected",
        &["code"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    pub static ref HEADERS_PREPENDED: IntCounter = register_int_counter!(
        "ingest_headers_prepended_total",
        "Total number of historical headers spliced before the window"
    )
    .expect("Failed to create HEADERS_PREPENDED metric");

    pub static ref ROLLBACKS: IntCounter = register_int_counter!(
        "ingest_rollbacks_total",
        "Total number of rollbacks that removed headers"
    )
    .expect("Failed to create ROLLBACKS metric");

    pub static ref VALIDATION_LATENCY: Histogram = register_histogram!(
        "ingest_validation_latency_seconds",
        "Time taken to validate a block in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to create VALIDATION_LATENCY metric");
}

#[cfg(feature = "metrics")]
pub fn record_block_added() {
    BLOCKS_ADDED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_block_rejected(code: &str) {
    BLOCKS_REJECTED.with_label_values(&[code]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_headers_prepended(count: usize) {
    HEADERS_PREPENDED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_rollback() {
    ROLLBACKS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_validation_latency(seconds: f64) {
    VALIDATION_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_block_added() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_code: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_headers_prepended(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rollback() {}

#[cfg(not(feature = "metrics"))]
pub fn record_validation_latency(_seconds: f64) {}
