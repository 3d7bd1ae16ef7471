#![forbid(unsafe_code)]

//! Bounded FIFO evidence ledger.
//!
//! Used by the rate pipeline to keep an audit trail of per-window decisions
//! (which spectrum was trusted, how far the fast transform drifted from the
//! direct oracle) without growing without bound in long-running streams.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Bounded FIFO buffer of evidence entries.
///
/// Capacity is `capacity.max(1)`. When full, the oldest entry is evicted
/// before a new entry is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLedger<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> EvidenceLedger<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Append an entry, evicting the oldest if at capacity.
    pub fn record(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Remove and return every entry, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.entries.drain(..).collect()
    }
}

impl<T: Serialize> EvidenceLedger<T> {
    /// One JSON object per line, oldest first.
    #[must_use]
    pub fn serialize_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|entry| serde_json::to_string(entry).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
