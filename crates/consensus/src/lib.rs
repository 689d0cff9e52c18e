// consensus/src/lib.rs

//! The Nxt-style proof-of-stake consensus core: pure arithmetic
//! ([`kernel`]), the unconfirmed transaction pool ([`pool`]), block
//! production ([`forger`]), inbound block checking ([`validator`]), and
//! the sibling fork-choice tie-break ([`ordering`]).
//!
//! Every public operation here is a pure function of an injected
//! `History`/`State` snapshot plus an externally supplied clock — this
//! crate never reads a clock, touches the network, or writes to disk.
//! Peer gossip, signature verification, on-disk storage, and balance
//! bookkeeping are collaborators consumed only through the traits below.

pub mod forger;
pub mod kernel;
pub mod ordering;
pub mod pool;
pub mod validator;

pub use forger::{try_generate_next_block, BLOCK_VERSION};
pub use ordering::{compare_siblings, next_block_generation_time};
pub use pool::{block_ordering_cmp, pool_ordering_cmp, Pool};
pub use validator::is_valid;

use blockchain_core::{BlockchainError, History, Settings, State, Transaction};
use blockchain_crypto::Hash;

/// The chain's notion of "now": local wall clock corrected by whatever
/// clock-drift estimate the networking layer has accumulated from peer
/// handshakes. Every timestamp the consensus core compares against
/// (`now_ms` in every public operation here) is expected to come from
/// this, not from reading the system clock directly — the core itself
/// never does so.
pub trait TimeSource: Send + Sync {
    fn corrected_time_ms(&self) -> i64;
}

/// What the block builder collaborator needs to turn a consensus decision
/// into a concrete, signed `Block`. The consensus core hands this
/// everything it computed (version, timestamp, parent, consensus data,
/// packed transactions, signer) and never inspects how the signature
/// itself is produced.
pub trait BlockBuilder: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn build_and_sign(
        &self,
        version: u32,
        timestamp: i64,
        parent_id: Hash,
        consensus: blockchain_core::ConsensusData,
        transactions: Vec<Transaction>,
        signer: &blockchain_crypto::PrivateKey,
    ) -> blockchain_core::Block;
}

/// The leveled transaction validator, treated as an oracle returning a
/// valid subset: everything this crate does not know about transaction
/// semantics (balances, signatures, nonces, contract execution, ...)
/// lives on the other side of this trait.
pub trait TransactionValidator: Send + Sync {
    /// Split `txs` into `(rejected, accepted)` against `state` as of
    /// `at_height` (the chain tip if `None`) and `now_ms`. Must be
    /// deterministic for a fixed `state` snapshot.
    fn validate(
        &self,
        settings: &Settings,
        state: &dyn State,
        txs: &[Transaction],
        at_height: Option<i32>,
        now_ms: i64,
    ) -> (Vec<Transaction>, Vec<Transaction>);
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Errors the consensus core actually raises. Ineligibility, a missing
/// parent, and an invalid inbound block are *not* represented here — per
/// the error taxonomy this crate follows, those are already captured by
/// `Option`/`bool` return values, since they are the expected outcome of
/// forking rules, not programming errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("transaction rejected by validator: {0}")]
    Validation(#[from] ValidationError),

    #[error("blockchain error: {0}")]
    Blockchain(#[from] BlockchainError),
}

/// Surfaced from [`on_new_offchain_transaction`] when the external
/// transaction validator will not admit a transaction. Not a fork
/// condition: different nodes may legitimately reach different verdicts
/// about an off-chain transaction depending on their own mempool/state.
#[derive(Debug, thiserror::Error)]
#[error("transaction {0} rejected by validator")]
pub struct ValidationError(pub Hash);

/// Opaque identifier for the peer a transaction arrived from, so that
/// gossip — out of scope for this crate — can avoid echoing a
/// transaction straight back to whoever sent it. The consensus core
/// never inspects this value; it is accepted here purely so callers
/// have somewhere to thread it through.
pub type PeerId = String;

/// Admit `tx` to the unconfirmed pool iff the external transaction
/// validator accepts it against the current chain tip.
#[allow(clippy::too_many_arguments)]
pub fn on_new_offchain_transaction(
    history: &dyn History,
    state: &dyn State,
    settings: &Settings,
    pool: &Pool,
    validator: &dyn TransactionValidator,
    tx: Transaction,
    _except_peer: Option<PeerId>,
    now_ms: i64,
) -> ConsensusResult<Transaction> {
    let at_height = Some(history.height());
    let (_, accepted) = validator.validate(settings, state, std::slice::from_ref(&tx), at_height, now_ms);
    if accepted.iter().any(|a| a.id == tx.id) {
        pool.add(tx.clone());
        Ok(tx)
    } else {
        Err(ValidationError(tx.id).into())
    }
}

/// Remove transactions that a newly applied block confirmed, and prune
/// anything else that has since gone stale.
pub fn clear_from_unconfirmed(pool: &Pool, settings: &Settings, applied: &[Hash], now_ms: i64) {
    pool.remove_applied(applied, settings, now_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockchain_core::{Block, InMemoryHistory, InMemoryState};
    use blockchain_crypto::PublicKey;

    struct AcceptAll;
    impl TransactionValidator for AcceptAll {
        fn validate(
            &self,
            _settings: &Settings,
            _state: &dyn State,
            txs: &[Transaction],
            _at_height: Option<i32>,
            _now_ms: i64,
        ) -> (Vec<Transaction>, Vec<Transaction>) {
            (Vec::new(), txs.to_vec())
        }
    }

    struct RejectAll;
    impl TransactionValidator for RejectAll {
        fn validate(
            &self,
            _settings: &Settings,
            _state: &dyn State,
            txs: &[Transaction],
            _at_height: Option<i32>,
            _now_ms: i64,
        ) -> (Vec<Transaction>, Vec<Transaction>) {
            (txs.to_vec(), Vec::new())
        }
    }

    fn history() -> InMemoryHistory {
        InMemoryHistory::new(Block::genesis(0, 153_722_867))
    }

    #[test]
    fn accepted_transaction_enters_the_pool() {
        let history = history();
        let state = InMemoryState::new();
        let settings = Settings::default();
        let pool = Pool::new();
        let tx = Transaction::new(0, 10, PublicKey::new([1u8; 32]), vec![1]);

        let result = on_new_offchain_transaction(&history, &state, &settings, &pool, &AcceptAll, tx.clone(), None, 0);
        assert!(result.is_ok());
        assert!(pool.contains(&tx.id));
    }

    #[test]
    fn rejected_transaction_never_enters_the_pool() {
        let history = history();
        let state = InMemoryState::new();
        let settings = Settings::default();
        let pool = Pool::new();
        let tx = Transaction::new(0, 10, PublicKey::new([1u8; 32]), vec![1]);

        let result = on_new_offchain_transaction(&history, &state, &settings, &pool, &RejectAll, tx.clone(), None, 0);
        assert!(result.is_err());
        assert!(!pool.contains(&tx.id));
    }
}
