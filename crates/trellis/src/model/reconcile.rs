//! Collection reconciliation.
//!
//! The reconciler's only state is the ordered sequence of record ids it
//! believes are present in the grid. Diffing that identity set against a
//! new collection snapshot yields the minimal add/remove plan; committing
//! the snapshot replaces the identity set entirely.
//!
//! Calls must be strictly serialized. The binding enforces this by taking
//! `&mut self` on the reconciling path - if this type is ever driven from
//! a concurrent environment, wrap it in an explicit single-writer queue.

use super::record::{Record, RecordId};

/// The minimal set of operations to bring the grid in line with a new
/// collection snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionDiff {
    /// Indices into the new collection of records to insert, in collection
    /// order.
    pub added: Vec<usize>,
    /// Ids of rows to remove. Removals do not reorder survivors.
    pub removed: Vec<RecordId>,
}

impl CollectionDiff {
    /// Returns `true` if the diff carries no operations.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks the ordered identity set of rows present in the grid.
#[derive(Debug, Clone, Default)]
pub struct CollectionReconciler {
    known_ids: Vec<RecordId>,
}

impl CollectionReconciler {
    /// Create a reconciler with an empty identity set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconciler pre-seeded with the ids of an initial
    /// collection.
    ///
    /// Initial population bypasses diffing: rows are bulk-added directly
    /// and the identity set starts out matching them, before any change
    /// notifications can arrive.
    pub fn seeded<R: Record>(records: &[R]) -> Self {
        Self {
            known_ids: records.iter().map(Record::record_id).collect(),
        }
    }

    /// The ids currently believed present, in order.
    pub fn known_ids(&self) -> &[RecordId] {
        &self.known_ids
    }

    /// Compute the minimal add/remove plan for a new collection snapshot.
    ///
    /// Additions preserve the snapshot's order. An empty snapshot forces a
    /// full clear regardless of id matching.
    pub fn diff<R: Record>(&self, records: &[R]) -> CollectionDiff {
        let new_ids: Vec<RecordId> = records.iter().map(Record::record_id).collect();

        let added = new_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| !self.known_ids.contains(id))
            .map(|(i, _)| i)
            .collect();

        let removed = if records.is_empty() {
            self.known_ids.clone()
        } else {
            self.known_ids
                .iter()
                .filter(|id| !new_ids.contains(id))
                .cloned()
                .collect()
        };

        CollectionDiff { added, removed }
    }

    /// Replace the identity set with the snapshot's ids.
    ///
    /// After this, `known_ids` equals `records.map(id)` in collection
    /// order.
    pub fn commit<R: Record>(&mut self, records: &[R]) {
        self.known_ids = records.iter().map(Record::record_id).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn items(ids: &[i64]) -> Vec<Value> {
        ids.iter().map(|id| json!({"id": id})).collect()
    }

    #[test]
    fn test_diff_detects_additions_in_order() {
        let reconciler = CollectionReconciler::seeded(&items(&[1]));
        let diff = reconciler.diff(&items(&[3, 1, 2]));
        assert_eq!(diff.added, vec![0, 2]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_diff_detects_removals() {
        let reconciler = CollectionReconciler::seeded(&items(&[1, 2, 3]));
        let diff = reconciler.diff(&items(&[2]));
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, vec![RecordId::Int(1), RecordId::Int(3)]);
    }

    #[test]
    fn test_empty_snapshot_clears_everything() {
        let reconciler = CollectionReconciler::seeded(&items(&[1, 2]));
        let diff = reconciler.diff(&items(&[]));
        assert_eq!(diff.removed, vec![RecordId::Int(1), RecordId::Int(2)]);
        assert!(diff.added.is_empty());
    }

    #[test]
    fn test_commit_establishes_identity_invariant() {
        let mut reconciler = CollectionReconciler::new();
        let snapshot = items(&[5, 6]);
        reconciler.commit(&snapshot);
        assert_eq!(
            reconciler.known_ids(),
            &[RecordId::Int(5), RecordId::Int(6)]
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut reconciler = CollectionReconciler::new();
        let snapshot = items(&[1, 2]);

        let first = reconciler.diff(&snapshot);
        assert_eq!(first.added, vec![0, 1]);
        reconciler.commit(&snapshot);

        let second = reconciler.diff(&snapshot);
        assert!(second.is_empty());
    }

    #[test]
    fn test_sequential_snapshots_converge() {
        let mut reconciler = CollectionReconciler::new();

        let c1 = items(&[1, 2, 3]);
        reconciler.commit(&c1);

        let c2 = items(&[2, 4]);
        let diff = reconciler.diff(&c2);
        assert_eq!(diff.added, vec![1]);
        assert_eq!(diff.removed, vec![RecordId::Int(1), RecordId::Int(3)]);

        reconciler.commit(&c2);
        assert_eq!(
            reconciler.known_ids(),
            &[RecordId::Int(2), RecordId::Int(4)]
        );
    }

    #[test]
    fn test_string_and_int_ids_coexist() {
        let mixed = vec![json!({"id": 1}), json!({"id": "a"})];
        let reconciler = CollectionReconciler::seeded(&mixed);
        assert_eq!(
            reconciler.known_ids(),
            &[RecordId::Int(1), RecordId::Str("a".into())]
        );
    }
}
