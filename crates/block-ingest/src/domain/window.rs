//! Header window
//!
//! Bounded, contiguous, oldest-first sequence of recent headers for one
//! chain. Every mutation preserves:
//!
//! - consecutive entries link by `height + 1` and `previous_hash`
//! - timestamps strictly increase
//! - `len() <= capacity()`, evicting the oldest prefix on overflow

use super::block::BlockHeader;
use shared_types::ErrorCode;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("height discontinuity: expected {expected}, got {actual}")]
    HeightGap { expected: u64, actual: u64 },

    #[error("previous hash mismatch at height {height}")]
    HashMismatch { height: u64 },

    #[error("timestamp {timestamp} at height {height} is not after {previous}")]
    TimestampNotIncreasing {
        height: u64,
        timestamp: u64,
        previous: u64,
    },
}

impl WindowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WindowError::HeightGap { .. } | WindowError::HashMismatch { .. } => {
                ErrorCode::Discontinuity
            }
            WindowError::TimestampNotIncreasing { .. } => ErrorCode::TimestampInvalid,
        }
    }
}

/// Check that `child` directly follows `parent`.
fn check_link(parent: &BlockHeader, child: &BlockHeader) -> Result<(), WindowError> {
    match parent.height.checked_add(1) {
        Some(expected) if expected == child.height => {}
        Some(expected) => {
            return Err(WindowError::HeightGap {
                expected,
                actual: child.height,
            })
        }
        None => {
            return Err(WindowError::HeightGap {
                expected: parent.height,
                actual: child.height,
            })
        }
    }
    if child.previous_hash != parent.hash {
        return Err(WindowError::HashMismatch {
            height: child.height,
        });
    }
    if child.timestamp <= parent.timestamp {
        return Err(WindowError::TimestampNotIncreasing {
            height: child.height,
            timestamp: child.timestamp,
            previous: parent.timestamp,
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HeaderWindow {
    headers: VecDeque<BlockHeader>,
    capacity: usize,
}

impl HeaderWindow {
    /// Create an empty window holding at most `capacity` headers (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            headers: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Newest header.
    pub fn tip(&self) -> Option<&BlockHeader> {
        self.headers.back()
    }

    pub fn tip_height(&self) -> Option<u64> {
        self.tip().map(|h| h.height)
    }

    /// Oldest header.
    pub fn oldest(&self) -> Option<&BlockHeader> {
        self.headers.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockHeader> {
        self.headers.iter()
    }

    /// Append `header` after the tip, then evict the oldest overflow.
    ///
    /// Leaves the window untouched on error.
    pub fn append(&mut self, header: BlockHeader) -> Result<(), WindowError> {
        if let Some(tip) = self.tip() {
            check_link(tip, &header)?;
        }
        self.headers.push_back(header);
        self.evict_overflow();
        Ok(())
    }

    /// Splice an oldest-first `batch` before the current oldest header.
    ///
    /// The batch must be internally continuous and, when the window is not
    /// empty, its last header must be the parent of the current oldest.
    /// Returns the number of headers evicted to restore the bound.
    pub fn prepend(&mut self, batch: Vec<BlockHeader>) -> Result<usize, WindowError> {
        for pair in batch.windows(2) {
            check_link(&pair[0], &pair[1])?;
        }
        if let (Some(last), Some(oldest)) = (batch.last(), self.oldest()) {
            check_link(last, oldest)?;
        }
        for header in batch.into_iter().rev() {
            self.headers.push_front(header);
        }
        Ok(self.evict_overflow())
    }

    /// Remove every header with `height >= target`. Returns how many were removed.
    pub fn truncate_from(&mut self, target: u64) -> usize {
        let Some(oldest) = self.oldest().map(|h| h.height) else {
            return 0;
        };
        let before = self.headers.len();
        if target <= oldest {
            self.headers.clear();
        } else {
            let keep = usize::try_from(target - oldest).unwrap_or(usize::MAX);
            self.headers.truncate(keep);
        }
        before - self.headers.len()
    }

    /// Headers with `lo <= height <= hi`, oldest first.
    pub fn range_by_height(&self, lo: u64, hi: u64) -> Vec<BlockHeader> {
        let (Some(oldest), Some(tip)) = (self.oldest(), self.tip()) else {
            return Vec::new();
        };
        let lo = lo.max(oldest.height);
        let hi = hi.min(tip.height);
        if lo > hi {
            return Vec::new();
        }
        let start = (lo - oldest.height) as usize;
        let end = (hi - oldest.height) as usize;
        self.headers.range(start..=end).cloned().collect()
    }

    fn evict_overflow(&mut self) -> usize {
        let overflow = self.headers.len().saturating_sub(self.capacity);
        self.headers.drain(..overflow);
        overflow
    }
}
