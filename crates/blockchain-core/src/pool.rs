// blockchain-core/src/pool.rs

use crate::transaction::Transaction;
use blockchain_crypto::Hash;
use std::collections::HashMap;

/// Raw storage for not-yet-confirmed transactions, keyed by id.
///
/// This type knows nothing about fee ordering, validation, or locking — it
/// is the plain map the consensus crate's `Pool` wraps with `PoolOrdering`,
/// revalidation and a mutex. Kept here because `Transaction` lives here too.
#[derive(Debug, Default)]
pub struct UnconfirmedPool {
    entries: HashMap<Hash, Transaction>,
}

impl UnconfirmedPool {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a transaction. Returns `false` without replacing anything if
    /// a transaction with the same id is already present.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        if self.entries.contains_key(&tx.id) {
            return false;
        }
        self.entries.insert(tx.id, tx);
        true
    }

    pub fn remove(&mut self, id: &Hash) -> Option<Transaction> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &Hash) -> Option<&Transaction> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A cloned snapshot of every transaction currently held. Cloning keeps
    /// the lock (held by the caller) short-lived: sorting and revalidation
    /// happen on the snapshot, not while holding the map.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockchain_crypto::PublicKey;

    fn tx(fee: u64) -> Transaction {
        Transaction::new(1_000, fee, PublicKey::zero(), vec![1])
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut pool = UnconfirmedPool::new();
        let t = tx(10);
        assert!(pool.insert(t.clone()));
        assert!(!pool.insert(t));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_returns_the_removed_transaction() {
        let mut pool = UnconfirmedPool::new();
        let t = tx(10);
        pool.insert(t.clone());
        assert_eq!(pool.remove(&t.id), Some(t));
        assert!(pool.is_empty());
    }
}
