//! Batch assembly and identifier correlation.
//!
//! A logical multi-item call becomes a uniform list of tasks (a scalar
//! input is a one-element batch), the pool produces one outcome per task,
//! and [`correlate`] zips the outcomes back onto the identifiers that
//! produced them. The map always contains exactly one entry per input
//! identifier, however many individual requests failed.

use std::collections::{HashMap, HashSet};

use crate::error::{NylasError, Result};
use crate::models::Outcome;
use crate::transport::DecodeMode;

/// Default number of requests in flight per batch.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Per-call execution options for a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Maximum number of requests in flight (clamped to at least 1).
    pub concurrency: usize,
    /// How undecodable response bodies are surfaced.
    pub decode_mode: DecodeMode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            decode_mode: DecodeMode::default(),
        }
    }
}

impl BatchOptions {
    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Set the decode mode.
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }
}

/// Reject a batch containing the same identifier twice.
///
/// A duplicate would collapse two outcomes onto one key and silently drop
/// one of them, breaking the one-entry-per-identifier guarantee.
pub(crate) fn ensure_unique(ids: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(NylasError::Validation(format!(
                "duplicate identifier in batch: {id}"
            )));
        }
    }
    Ok(())
}

/// Zip identifiers onto outcomes.
///
/// Both sequences must have equal length; a mismatch indicates a bug in
/// batch assembly and asserts rather than surfacing a runtime error.
pub fn correlate(ids: Vec<String>, outcomes: Vec<Outcome>) -> HashMap<String, Outcome> {
    assert_eq!(
        ids.len(),
        outcomes.len(),
        "identifier/outcome length mismatch: {} identifiers, {} outcomes",
        ids.len(),
        outcomes.len()
    );
    ids.into_iter().zip(outcomes).collect()
}
