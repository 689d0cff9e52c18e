// blockchain-core/src/lib.rs

//! Core blockchain data structures shared by the consensus crate and the node.
//!
//! This crate provides:
//! - `Block` / `Transaction`, the on-chain data model
//! - `History` / `State`, the read-only collaborator traits the consensus
//!   kernel reads from, plus in-memory implementations for demos and tests
//! - `UnconfirmedPool`, raw not-yet-confirmed transaction storage
//! - `Settings`, the chain's tunable parameters

pub mod block;
pub mod history;
pub mod pool;
pub mod settings;
pub mod state;
pub mod transaction;
pub mod types;

pub use block::{Block, ConsensusData};
pub use history::{History, InMemoryHistory};
pub use pool::UnconfirmedPool;
pub use settings::Settings;
pub use state::{InMemoryState, State};
pub use transaction::Transaction;
pub use types::{Balance, Height, Timestamp};

use blockchain_crypto::Hash;

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Errors that can occur in blockchain-core operations.
#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("invalid block: {0}")]
    InvalidBlock(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("block not found: {0}")]
    BlockNotFound(Hash),

    #[error("transaction not found: {0}")]
    TransactionNotFound(Hash),

    #[error("cryptographic error: {0}")]
    CryptoError(#[from] blockchain_crypto::CryptoError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
