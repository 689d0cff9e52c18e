// consensus/src/pool.rs

//! The shared mutable region of the consensus core: the unconfirmed
//! transaction pool. Every mutator goes through the single mutex here;
//! Kernel and Validator never take it.

use std::cmp::Ordering;
use std::sync::Mutex;

use blockchain_core::{Settings, State, Transaction, UnconfirmedPool};
use blockchain_crypto::Hash;

use crate::TransactionValidator;

/// Sort key used while selecting candidates for a block: descending
/// fee-per-byte, ties broken ascending by id so the order is identical on
/// every node regardless of arrival order.
pub fn pool_ordering_cmp(a: &Transaction, b: &Transaction) -> Ordering {
    match b.fee_per_byte().partial_cmp(&a.fee_per_byte()) {
        Some(Ordering::Equal) | None => a.id.as_bytes().cmp(b.id.as_bytes()),
        Some(other) => other,
    }
}

/// Sort key used for the final, in-block transaction order: ascending by
/// `(sender, id)`. Unlike `PoolOrdering` this has nothing to do with fees —
/// it exists purely so every node that selects the same transaction set
/// lays them out identically inside the block.
pub fn block_ordering_cmp(a: &Transaction, b: &Transaction) -> Ordering {
    (a.sender.as_bytes(), a.id.as_bytes()).cmp(&(b.sender.as_bytes(), b.id.as_bytes()))
}

/// Mutex-guarded unconfirmed transaction pool.
///
/// The mutex is scoped tightly: every method takes it, does a bounded
/// amount of work (insert / snapshot+sort / prune), and releases it before
/// returning. Nothing in the consensus crate holds it across a call into
/// `TransactionValidator`, which is caller-supplied and of unknown cost.
pub struct Pool {
    inner: Mutex<UnconfirmedPool>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(UnconfirmedPool::new()),
        }
    }

    /// Admit a transaction into the unconfirmed pool. Returns `false` if a
    /// transaction with the same id is already present.
    pub fn add(&self, tx: Transaction) -> bool {
        self.inner.lock().expect("pool mutex poisoned").insert(tx)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("pool mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("pool mutex poisoned").is_empty()
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.inner.lock().expect("pool mutex poisoned").contains(id)
    }

    /// Drop every unconfirmed transaction whose timestamp no longer falls
    /// within `[now_ms - max_tx_age_past_ms, now_ms + max_tx_age_future_ms]`.
    pub fn prune(&self, settings: &Settings, now_ms: i64) {
        let mut guard = self.inner.lock().expect("pool mutex poisoned");
        prune_locked(&mut guard, settings, now_ms);
    }

    /// Remove transactions that were just included in an adopted block,
    /// then prune whatever else has gone stale in the same pass.
    pub fn remove_applied(&self, tx_ids: &[Hash], settings: &Settings, now_ms: i64) {
        let mut guard = self.inner.lock().expect("pool mutex poisoned");
        for id in tx_ids {
            guard.remove(id);
        }
        prune_locked(&mut guard, settings, now_ms);
    }

    /// Select transactions for a new block.
    ///
    /// 1. prune expired/future-dated entries
    /// 2. snapshot and sort by `PoolOrdering` (fee-per-byte descending)
    /// 3. revalidate; anything the validator rejects is dropped from the
    ///    pool as well as from the candidate list
    /// 4. take the top `max_tx_per_block` and re-sort by `BlockOrdering`
    /// 5. revalidate once more, since re-ordering can change which
    ///    transactions are mutually valid (e.g. balance-dependent checks)
    pub fn pack(
        &self,
        settings: &Settings,
        state: &dyn State,
        validator: &dyn TransactionValidator,
        now_ms: i64,
        at_height: Option<i32>,
    ) -> Vec<Transaction> {
        let mut guard = self.inner.lock().expect("pool mutex poisoned");
        prune_locked(&mut guard, settings, now_ms);
        let mut candidates = guard.snapshot();
        drop(guard);

        candidates.sort_by(pool_ordering_cmp);
        let (_, accepted) = validator.validate(settings, state, &candidates, at_height, now_ms);

        let mut guard = self.inner.lock().expect("pool mutex poisoned");
        for tx in &candidates {
            if !accepted.iter().any(|a| a.id == tx.id) {
                guard.remove(&tx.id);
            }
        }
        drop(guard);

        let mut selected: Vec<Transaction> = accepted.into_iter().take(settings.max_tx_per_block).collect();
        selected.sort_by(block_ordering_cmp);

        let (_, accepted_again) = validator.validate(settings, state, &selected, at_height, now_ms);
        accepted_again
    }
}

fn prune_locked(pool: &mut UnconfirmedPool, settings: &Settings, now_ms: i64) {
    let expired: Vec<Hash> = pool
        .snapshot()
        .into_iter()
        .filter(|tx| {
            let age = now_ms - tx.timestamp;
            age > settings.max_tx_age_past_ms || -age > settings.max_tx_age_future_ms
        })
        .map(|tx| tx.id)
        .collect();
    for id in expired {
        pool.remove(&id);
    }
}
