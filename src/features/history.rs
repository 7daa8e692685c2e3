//! Append-only per-entity feature history for point-in-time lookups.

use super::FeatureRow;
use serde::Serialize;

/// Feature values valid from `valid_from` until the next snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub valid_from: i64,
    pub row: FeatureRow,
}

/// Snapshots ordered by strictly increasing `valid_from`.
#[derive(Debug, Clone, Default)]
pub struct FeatureHistory {
    snapshots: Vec<Snapshot>,
}

impl FeatureHistory {
    /// Append a snapshot. A snapshot at the same `valid_from` as the last one replaces it.
    pub(crate) fn push(&mut self, valid_from: i64, row: FeatureRow) {
        if let Some(last) = self.snapshots.last_mut() {
            if last.valid_from == valid_from {
                last.row = row;
                return;
            }
            debug_assert!(last.valid_from < valid_from, "history must be appended in time order");
        }
        self.snapshots.push(Snapshot { valid_from, row });
    }

    /// Latest snapshot with `valid_from <= ts`, or `None` if `ts` precedes the first one.
    pub fn as_of(&self, ts: i64) -> Option<&Snapshot> {
        let idx = self.snapshots.partition_point(|s| s.valid_from <= ts);
        idx.checked_sub(1).map(|i| &self.snapshots[i])
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
