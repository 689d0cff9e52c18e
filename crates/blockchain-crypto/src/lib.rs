// blockchain-crypto/src/lib.rs

//! Cryptographic primitives for the consensus core
//!
//! This crate provides:
//! - Hashing functions (SHA256, SHA3, Blake3) and the concatenate-then-hash
//!   `digest` helper the generation signature is built from
//! - Ed25519 signing and verification
//! - Fixed-size account identities (`PublicKey`/`PrivateKey`)

pub mod hash;
pub mod keypair;
pub mod signature;

pub use hash::{digest, Hash, HashAlgorithm, Hashable};
pub use keypair::{PrivateKey, PublicKey};
pub use signature::Signature;

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Invalid hash")]
    InvalidHash,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Random number generation failed")]
    RngError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_basics() {
        let keypair = PrivateKey::generate().unwrap();
        let message = b"Hello, blockchain!";
        let signature = keypair.sign(message).unwrap();
        assert!(keypair.public_key().verify(message, &signature).unwrap());
    }

    #[test]
    fn test_digest_is_concatenation_then_hash() {
        let a = b"left";
        let b = b"right";
        let mut combined = Vec::new();
        combined.extend_from_slice(a);
        combined.extend_from_slice(b);

        assert_eq!(digest(&[a, b]), combined.hash());
    }
}
