//! # Batch processor
//! Pure ranking over a set of raw items: score each one, drop title duplicates,
//! order by score. No I/O, suitable for unit tests and offline replays.
//!
//! Dedup key: first 50 chars of the lowercased title. The first record per key
//! (input order) survives, rejects included. Ordering is a stable sort by score
//! descending, so equal scores keep their post-dedup order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::analyze;
use crate::ingest::types::RawItem;
use crate::profile::Profile;
use crate::record::ScoredRecord;

/// Characters of the lowercased title that make up the dedup key.
pub const DEDUP_KEY_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no results available; run a scan first")]
    Empty,
    #[error("index out of range [1, {len}]")]
    OutOfRange { rank: usize, len: usize },
}

/// Deduplicated, score-ordered records of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult {
    records: Vec<ScoredRecord>,
}

impl BatchResult {
    /// Wrap records that are already deduplicated and ordered (e.g. a saved run).
    pub fn from_ranked(records: Vec<ScoredRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.records.iter()
    }

    /// Record at 1-based `rank`.
    pub fn select(&self, rank: usize) -> Result<&ScoredRecord, SelectError> {
        if self.records.is_empty() {
            return Err(SelectError::Empty);
        }
        if rank == 0 || rank > self.records.len() {
            return Err(SelectError::OutOfRange {
                rank,
                len: self.records.len(),
            });
        }
        Ok(&self.records[rank - 1])
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Score, dedup and rank `items`.
pub fn score_batch(items: &[RawItem], profile: &Profile) -> BatchResult {
    let scored = items
        .iter()
        .map(|it| {
            let rec = analyze::score(it, profile);
            tracing::debug!(
                target: "scoring",
                id = %it.id,
                score = rec.score,
                status = %rec.status,
                hook = %rec.hook_kind,
                "item scored"
            );
            rec
        })
        .collect::<Vec<_>>();
    rank(scored)
}

/// Dedup + stable sort over records that were scored independently.
pub fn rank(scored: Vec<ScoredRecord>) -> BatchResult {
    let total = scored.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut records = scored
        .into_iter()
        .filter(|r| seen.insert(dedup_key(&r.item.title)))
        .collect::<Vec<_>>();

    // `sort_by` is stable: ties keep input order.
    records.sort_by(|a, b| b.score.cmp(&a.score));

    if records.len() < total {
        tracing::debug!(
            target: "scoring",
            dropped = total - records.len(),
            kept = records.len(),
            "duplicate titles dropped"
        );
    }
    BatchResult { records }
}

/// First `DEDUP_KEY_CHARS` characters of the lowercased title.
pub fn dedup_key(title: &str) -> String {
    title.to_lowercase().chars().take(DEDUP_KEY_CHARS).collect()
}
