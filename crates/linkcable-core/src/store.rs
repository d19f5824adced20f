//! In-memory collection store for the two record collections
//!
//! The party is client-owned and seeded with the configured roster; the
//! storage collection belongs to the peripheral and fills only through
//! received moves. Both are ordered by insertion, and a record belongs to
//! exactly one collection at a time.

use tracing::debug;

use crate::types::{OpCode, Record, RecordIndex};

// ----------------------------------------------------------------------------
// Snapshots and Outcomes
// ----------------------------------------------------------------------------

/// Point-in-time owned copy of both collections for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSnapshot {
    pub party: Vec<Record>,
    pub storage: Vec<Record>,
}

/// Result of applying one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The record moved; carries the updated snapshot
    Moved(CollectionSnapshot),
    /// The record was not in the source collection; nothing changed
    RecordNotInSource { op_code: OpCode, index: RecordIndex },
}

impl MoveOutcome {
    /// Whether the move was applied
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved(_))
    }
}

// ----------------------------------------------------------------------------
// Collection Store
// ----------------------------------------------------------------------------

/// Holds the party and storage collections and applies moves atomically
#[derive(Debug, Clone)]
pub struct CollectionStore {
    party: Vec<Record>,
    storage: Vec<Record>,
}

impl CollectionStore {
    /// Create a store with the given starting party roster; storage
    /// starts empty until the peripheral sends moves.
    pub fn new(roster: impl IntoIterator<Item = RecordIndex>) -> Self {
        Self {
            party: roster.into_iter().map(Record::new).collect(),
            storage: Vec::new(),
        }
    }

    /// Apply one move between the collections
    ///
    /// `ToParty` takes storage as the source, `ToStorage` takes the party.
    /// The first record matching `index` is removed from the source and
    /// appended to the destination. A missing record refuses the move and
    /// leaves both collections untouched; that is an expected outcome,
    /// not an error.
    pub fn apply_move(&mut self, op_code: OpCode, index: RecordIndex) -> MoveOutcome {
        let (source, dest) = match op_code {
            OpCode::ToParty => (&mut self.storage, &mut self.party),
            OpCode::ToStorage => (&mut self.party, &mut self.storage),
        };

        match source.iter().position(|record| record.index == index) {
            Some(position) => {
                let record = source.remove(position);
                dest.push(record);
                debug!("moved {} {}", record, op_code);
                MoveOutcome::Moved(CollectionSnapshot {
                    party: self.party.clone(),
                    storage: self.storage.clone(),
                })
            }
            None => {
                debug!("refused {} {}: not in source collection", op_code, index);
                MoveOutcome::RecordNotInSource { op_code, index }
            }
        }
    }

    /// Owned point-in-time copies of both collections
    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            party: self.party.clone(),
            storage: self.storage.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_ROSTER;

    fn indices(records: &[Record]) -> Vec<u16> {
        records.iter().map(|r| r.index.value()).collect()
    }

    fn default_store() -> CollectionStore {
        CollectionStore::new(DEFAULT_ROSTER.map(RecordIndex::new))
    }

    #[test]
    fn test_initial_state() {
        let store = default_store();
        let snapshot = store.snapshot();
        assert_eq!(indices(&snapshot.party), vec![151, 150, 149, 145, 143, 130]);
        assert!(snapshot.storage.is_empty());
    }

    #[test]
    fn test_move_to_storage() {
        let mut store = default_store();
        let outcome = store.apply_move(OpCode::ToStorage, RecordIndex::new(151));

        let MoveOutcome::Moved(snapshot) = outcome else {
            panic!("move should have been applied");
        };
        assert_eq!(indices(&snapshot.party), vec![150, 149, 145, 143, 130]);
        assert_eq!(indices(&snapshot.storage), vec![151]);
    }

    #[test]
    fn test_round_trip_restores_collections() {
        let mut store = default_store();
        let before = store.snapshot();

        assert!(store
            .apply_move(OpCode::ToStorage, RecordIndex::new(151))
            .is_moved());
        assert!(store
            .apply_move(OpCode::ToParty, RecordIndex::new(151))
            .is_moved());

        // The record comes back at the end of the party, then nothing
        // else distinguishes the states for a roster without duplicates.
        let after = store.snapshot();
        assert_eq!(indices(&after.party), vec![150, 149, 145, 143, 130, 151]);
        assert!(after.storage.is_empty());
        assert_eq!(
            before.party.len() + before.storage.len(),
            after.party.len() + after.storage.len()
        );
    }

    #[test]
    fn test_missing_record_refuses_move() {
        let mut store = default_store();
        let before = store.snapshot();

        let outcome = store.apply_move(OpCode::ToStorage, RecordIndex::new(999));
        assert_eq!(
            outcome,
            MoveOutcome::RecordNotInSource {
                op_code: OpCode::ToStorage,
                index: RecordIndex::new(999),
            }
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_to_party_with_empty_storage_is_refused() {
        let mut store = default_store();
        let outcome = store.apply_move(OpCode::ToParty, RecordIndex::new(151));
        assert!(!outcome.is_moved());
    }

    #[test]
    fn test_duplicate_indices_move_one_at_a_time() {
        let mut store = CollectionStore::new([130, 130].map(RecordIndex::new));

        assert!(store
            .apply_move(OpCode::ToStorage, RecordIndex::new(130))
            .is_moved());
        let snapshot = store.snapshot();
        assert_eq!(indices(&snapshot.party), vec![130]);
        assert_eq!(indices(&snapshot.storage), vec![130]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = default_store();
        let mut snapshot = store.snapshot();
        snapshot.party.clear();
        assert_eq!(store.snapshot().party.len(), 6);
    }
}
