use std::collections::HashMap;

use board::PositionKey;

use crate::proof::ProofRecord;

/// Storage for proof records keyed by canonical position, injected into the
/// solver so independent searches can run against isolated stores.
pub trait ProofStore {
    fn get(&self, key: &PositionKey) -> Option<ProofRecord>;
    fn put(&mut self, key: PositionKey, record: ProofRecord);
}

/// Decides whether a stored record gives up its slot to a new one.
pub trait ReplacePolicy {
    fn replace_with(&self, old: &ProofRecord, new: &ProofRecord) -> bool;
}

/// The current policy: a new record always evicts the old one. A deliberate
/// simplification rather than a correctness requirement; swap in another
/// `ReplacePolicy` to change it.
#[derive(Default, Debug, Clone, Copy)]
pub struct AlwaysReplace;

impl ReplacePolicy for AlwaysReplace {
    fn replace_with(&self, _old: &ProofRecord, _new: &ProofRecord) -> bool {
        true
    }
}

/// Hash-backed transposition table. Uninitialized records are never stored.
#[derive(Debug, Default)]
pub struct TransTable<P = AlwaysReplace> {
    entries: HashMap<PositionKey, ProofRecord>,
    policy: P,
}

impl TransTable<AlwaysReplace> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ReplacePolicy> TransTable<P> {
    pub fn with_policy(policy: P) -> Self {
        TransTable {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ReplacePolicy> ProofStore for TransTable<P> {
    fn get(&self, key: &PositionKey) -> Option<ProofRecord> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: PositionKey, record: ProofRecord) {
        if !record.initialized() {
            return;
        }
        match self.entries.get_mut(&key) {
            Some(existing) => {
                if self.policy.replace_with(existing, &record) {
                    *existing = record;
                }
            }
            None => {
                self.entries.insert(key, record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::Cell;

    fn key(black: u128, white: u128) -> PositionKey {
        PositionKey {
            black,
            white,
            black_to_move: true,
        }
    }

    #[test]
    fn test_get_on_empty_table() {
        let table = TransTable::new();
        assert_eq!(table.get(&key(1, 2)), None);
    }

    #[test]
    fn test_put_then_get() {
        let mut table = TransTable::new();
        let record = ProofRecord::new(true, 5, 1, Cell::from_index(9));

        table.put(key(1, 2), record);
        assert_eq!(table.get(&key(1, 2)), Some(record));
        assert_eq!(table.get(&key(2, 1)), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_uninitialized_record_is_not_stored() {
        let mut table = TransTable::new();
        table.put(key(1, 2), ProofRecord::default());
        assert!(table.is_empty());
    }

    #[test]
    fn test_always_replace_overwrites() {
        let mut table = TransTable::new();
        let first = ProofRecord::new(true, 100, 4, Cell::from_index(9));
        let second = ProofRecord::new(false, 1, 0, Cell::from_index(10));

        table.put(key(1, 2), first);
        table.put(key(1, 2), second);
        assert_eq!(table.get(&key(1, 2)), Some(second));
    }

    #[test]
    fn test_custom_policy_can_keep_larger_proofs() {
        struct KeepLargerProof;
        impl ReplacePolicy for KeepLargerProof {
            fn replace_with(&self, old: &ProofRecord, new: &ProofRecord) -> bool {
                new.numstates >= old.numstates
            }
        }

        let mut table = TransTable::with_policy(KeepLargerProof);
        let large = ProofRecord::new(true, 100, 4, Cell::from_index(9));
        let small = ProofRecord::new(false, 1, 0, Cell::from_index(10));

        table.put(key(1, 2), large);
        table.put(key(1, 2), small);
        assert_eq!(table.get(&key(1, 2)), Some(large));
    }
}
