// blockchain-core/src/transaction.rs

use crate::types::Timestamp;
use blockchain_crypto::{Hash, Hashable, PublicKey};
use serde::{Deserialize, Serialize};

/// A single transaction.
///
/// The chain does not interpret `payload` — it is opaque to every consensus
/// operation (ordering, packing, validation all treat it as bytes). Whatever
/// sits above this crate is responsible for decoding and applying it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Hash,
    pub timestamp: Timestamp,
    pub fee: u64,
    pub sender: PublicKey,
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Build a transaction and derive its id from the signed fields.
    ///
    /// `id` is a hash of the content, not something callers pick, so two
    /// transactions with identical fields always collide rather than
    /// silently coexisting in the pool.
    pub fn new(timestamp: Timestamp, fee: u64, sender: PublicKey, payload: Vec<u8>) -> Self {
        let id = Self::derive_id(timestamp, fee, &sender, &payload);
        Self {
            id,
            timestamp,
            fee,
            sender,
            payload,
        }
    }

    fn derive_id(timestamp: Timestamp, fee: u64, sender: &PublicKey, payload: &[u8]) -> Hash {
        let mut buf = Vec::with_capacity(8 + 8 + 32 + payload.len());
        buf.extend_from_slice(&timestamp.to_be_bytes());
        buf.extend_from_slice(&fee.to_be_bytes());
        buf.extend_from_slice(sender.as_bytes());
        buf.extend_from_slice(payload);
        buf.hash()
    }

    /// Approximate wire size, used for fee-per-byte ordering.
    pub fn size_bytes(&self) -> usize {
        bincode::serialize(self)
            .map(|b| b.len())
            .unwrap_or_else(|_| self.payload.len() + 72)
    }

    /// Fee divided by size, the quantity `PoolOrdering` sorts by (descending).
    pub fn fee_per_byte(&self) -> f64 {
        self.fee as f64 / self.size_bytes().max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> PublicKey {
        PublicKey::new([7u8; 32])
    }

    #[test]
    fn id_is_deterministic_over_content() {
        let a = Transaction::new(1_000, 10, sender(), vec![1, 2, 3]);
        let b = Transaction::new(1_000, 10, sender(), vec![1, 2, 3]);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn id_changes_with_any_field() {
        let a = Transaction::new(1_000, 10, sender(), vec![1, 2, 3]);
        let b = Transaction::new(1_000, 11, sender(), vec![1, 2, 3]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn fee_per_byte_scales_with_fee() {
        let cheap = Transaction::new(1_000, 1, sender(), vec![0; 100]);
        let rich = Transaction::new(1_000, 1_000, sender(), vec![0; 100]);
        assert!(rich.fee_per_byte() > cheap.fee_per_byte());
    }
}
