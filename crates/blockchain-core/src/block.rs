// blockchain-core/src/block.rs

use crate::transaction::Transaction;
use crate::types::Timestamp;
use blockchain_crypto::{Hash, Hashable, PublicKey};
use serde::{Deserialize, Serialize};

/// The data a block carries for the consensus kernel: the retargeted
/// difficulty and the generator's derived generation signature.
///
/// `generation_signature` is `Digest(parent.consensus.generation_signature ‖ generator)` —
/// every node recomputes it rather than trusting the field at face value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsensusData {
    pub base_target: u64,
    pub generation_signature: Hash,
}

/// A block.
///
/// `score` is a monotone fork-weight accumulated by the layer that builds
/// blocks (each new block's score is at least its parent's); this crate
/// only ever reads it, never recomputes it, so sibling comparison stays a
/// pure function of two scores plus the ordering component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub id: Hash,
    pub parent_id: Hash,
    pub timestamp: Timestamp,
    pub generator: PublicKey,
    pub consensus: ConsensusData,
    pub transactions: Vec<Transaction>,
    pub score: u128,
    pub signature: Vec<u8>,
}

impl Block {
    /// Assemble a block and derive its id from everything but the signature.
    ///
    /// The signature is produced over this id, so id derivation must never
    /// depend on it — otherwise signing would change the thing being signed.
    pub fn new(
        parent_id: Hash,
        timestamp: Timestamp,
        generator: PublicKey,
        consensus: ConsensusData,
        transactions: Vec<Transaction>,
        score: u128,
        signature: Vec<u8>,
    ) -> Self {
        let id = Self::derive_id(parent_id, timestamp, &generator, &consensus, &transactions, score);
        Self {
            id,
            parent_id,
            timestamp,
            generator,
            consensus,
            transactions,
            score,
            signature,
        }
    }

    fn derive_id(
        parent_id: Hash,
        timestamp: Timestamp,
        generator: &PublicKey,
        consensus: &ConsensusData,
        transactions: &[Transaction],
        score: u128,
    ) -> Hash {
        let mut buf = Vec::new();
        buf.extend_from_slice(parent_id.as_bytes());
        buf.extend_from_slice(&timestamp.to_be_bytes());
        buf.extend_from_slice(generator.as_bytes());
        buf.extend_from_slice(&consensus.base_target.to_be_bytes());
        buf.extend_from_slice(consensus.generation_signature.as_bytes());
        for tx in transactions {
            buf.extend_from_slice(tx.id.as_bytes());
        }
        buf.extend_from_slice(&score.to_be_bytes());
        buf.hash()
    }

    /// The fixed genesis block every `History` is seeded with. Genesis has
    /// no real generator or signature — its generation signature is the
    /// zero hash, matching the convention the kernel uses for "no parent".
    pub fn genesis(timestamp: Timestamp, initial_base_target: u64) -> Self {
        Self::new(
            Hash::zero(),
            timestamp,
            PublicKey::zero(),
            ConsensusData {
                base_target: initial_base_target,
                generation_signature: Hash::zero(),
            },
            Vec::new(),
            0,
            Vec::new(),
        )
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_id == Hash::zero()
    }
}
