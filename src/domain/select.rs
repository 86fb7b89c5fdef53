//! Mask selection: enter the tree sideways through a layer chain, match the
//! rest of the mask downward, collect payloads below every match.

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::tree::ChrisTree;

/// Default cap on layer candidates considered by one selection.
pub const CANDIDATE_CAP: usize = 64;

/// Contiguous byte pattern matched from key position `offset` onward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    offset: usize,
    bytes: Vec<u8>,
}

impl Mask {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}", self.offset, hex::encode(&self.bytes))
    }
}

/// What a selection does with a candidate that does not match the rest of
/// the mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Drop the failing candidate, keep going with the others.
    #[default]
    Skip,
    /// Abandon the whole query with an empty result, discarding payloads
    /// already collected from earlier candidates.
    Abort,
}

impl FromStr for MismatchPolicy {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(TreeError::InvalidArgument(format!(
                "unknown mismatch policy: {other}"
            ))),
        }
    }
}

impl fmt::Display for MismatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Tuning for [`ChrisTree::select_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOptions {
    /// Maximum number of payloads returned. Must be at least 1.
    pub limit: usize,
    /// Maximum number of layer candidates considered; extra candidates are
    /// silently dropped.
    pub candidate_cap: usize,
    pub on_mismatch: MismatchPolicy,
}

impl SelectOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            limit: CANDIDATE_CAP,
            candidate_cap: CANDIDATE_CAP,
            on_mismatch: MismatchPolicy::default(),
        }
    }
}

impl<T> ChrisTree<T> {
    /// Select up to `limit` payloads whose key matches `mask`, with default
    /// options otherwise.
    pub fn select(&self, mask: &Mask, limit: usize) -> TreeResult<Vec<&T>> {
        self.select_with(mask, &SelectOptions::with_limit(limit))
    }

    /// Select the payloads of every key matching `mask`.
    ///
    /// Candidates are the nodes at depth `mask.offset()` carrying the mask's
    /// first byte, taken from the layer chain. Each candidate is followed
    /// down through the remaining mask bytes; the payloads below every
    /// surviving candidate are collected in pre-order until `limit` is
    /// reached.
    #[instrument(level = "debug", skip(self, mask), fields(mask = %mask))]
    pub fn select_with(&self, mask: &Mask, options: &SelectOptions) -> TreeResult<Vec<&T>> {
        self.check_select(mask, options)?;

        let candidates = self.layer_candidates(mask.offset, mask.bytes[0], options.candidate_cap);
        let mut selected = Vec::new();

        for candidate in candidates {
            let Some(matched) = self.descend(candidate, &mask.bytes[1..]) else {
                match options.on_mismatch {
                    MismatchPolicy::Skip => continue,
                    MismatchPolicy::Abort => {
                        debug!(discarded = selected.len(), "candidate mismatch, selection aborted");
                        return Ok(Vec::new());
                    }
                }
            };

            let room = options.limit - selected.len();
            selected.extend(self.payloads_from(matched).take(room));
            if selected.len() >= options.limit {
                break;
            }
        }

        debug!(count = selected.len(), "selection complete");
        Ok(selected)
    }

    fn check_select(&self, mask: &Mask, options: &SelectOptions) -> TreeResult<()> {
        let reason = if options.limit < 1 {
            Some("output limit must be at least 1".to_string())
        } else if options.candidate_cap < 1 {
            Some("candidate cap must be at least 1".to_string())
        } else if mask.is_empty() {
            Some("mask must contain at least one byte".to_string())
        } else if mask.offset >= self.depth() || mask.len() > self.depth() - mask.offset {
            Some(format!(
                "mask {} reaches past tree depth {}",
                mask,
                self.depth()
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => {
                warn!("invalid selection: {reason}");
                Err(TreeError::InvalidArgument(reason))
            }
            None => Ok(()),
        }
    }

    /// Nodes at `depth` with the given discriminator, in chain order, at
    /// most `cap` of them.
    fn layer_candidates(&self, depth: usize, discriminator: u8, cap: usize) -> Vec<Index> {
        let mut candidates = Vec::new();
        for idx in self.layer_nodes(depth) {
            let current = self.node(idx).discriminator;
            if current > discriminator {
                break;
            }
            if current == discriminator {
                if candidates.len() == cap {
                    trace!(cap, "candidate set truncated");
                    break;
                }
                candidates.push(idx);
            }
        }
        candidates
    }

    fn descend(&self, start: Index, bytes: &[u8]) -> Option<Index> {
        bytes
            .iter()
            .try_fold(start, |current, &byte| self.node(current).find_child(byte))
    }
}
