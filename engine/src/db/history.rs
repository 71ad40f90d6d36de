//! Append-only per-record history, keyed by `(block, vtxindex)`.
//!
//! Restoring a record's state at a past block is a bounded linear
//! scan backwards through its history rather than a general
//! reversible-op framework (spec.md §9 Design Notes).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::records::NameRecord;

/// Position of an operation within the canonical block order, used as
/// the history key's second component.
pub type HistoryKey = (u64, u32);

/// One snapshot of a name record's full state, taken immediately after
/// the operation at `(block, vtxindex)` committed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub block: u64,
    pub vtxindex: u32,
    pub snapshot: NameRecord,
}

/// Ordered log of a single name's history.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    entries: BTreeMap<HistoryKey, NameRecord>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn push(&mut self, block: u64, vtxindex: u32, snapshot: NameRecord) {
        self.entries.insert((block, vtxindex), snapshot);
    }

    /// Returns the most recent snapshot at or before `(block, vtxindex)`,
    /// i.e. the record's state as of that point in canonical order.
    pub fn snapshot_at(&self, block: u64, vtxindex: u32) -> Option<&NameRecord> {
        self.entries
            .range(..=(block, vtxindex))
            .next_back()
            .map(|(_, record)| record)
    }

    /// Returns every snapshot within `[start, end]` inclusive, in
    /// ascending `(block, vtxindex)` order.
    pub fn range(&self, start: u64, end: u64) -> Vec<&NameRecord> {
        self.entries
            .range((start, u32::MIN)..=(end, u32::MAX))
            .map(|(_, record)| record)
            .collect()
    }

    pub fn latest(&self) -> Option<&NameRecord> {
        self.entries.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
