//! Bounded in-memory snapshot history

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::snapshot::Snapshot;

/// Fixed-capacity FIFO buffer of snapshots.
///
/// Append-only: snapshots are never updated or deleted by key, and the
/// oldest entry is evicted once the capacity is reached. Insertion order
/// is capture order, so ranged reads come back in ascending time order
/// without sorting.
///
/// The store itself is not synchronized; the collector wraps it in an
/// `Arc<tokio::sync::RwLock<_>>` for the single-writer/multi-reader
/// access pattern.
#[derive(Debug)]
pub struct SeriesStore {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
}

impl SeriesStore {
    /// Create an empty store holding at most `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one snapshot, evicting the oldest first when at capacity.
    pub fn append(&mut self, snapshot: Snapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// All stored snapshots with `captured_at` in `[from, to]` inclusive,
    /// ascending. An empty result is a valid answer, not an error.
    pub fn range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Snapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.captured_at >= from && s.captured_at <= to)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
