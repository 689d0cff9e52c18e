// blockchain-crypto/src/keypair.rs

use crate::{CryptoError, CryptoResult, Signature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size in bytes of a `PublicKey`.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// An account's public identity: a fixed 32-byte tag.
///
/// Unlike a general-purpose key wrapper that carries a signature-scheme tag
/// alongside variable-length bytes, this type is intentionally fixed-size:
/// callers treat it as an opaque identifier they hash and compare, never as
/// cryptographic material they interpret.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn new(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::DeserializationError(e.to_string()))?;
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidPublicKey);
        }
        let mut arr = [0u8; PUBLIC_KEY_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Verify a signature produced by the matching `PrivateKey`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> CryptoResult<bool> {
        signature.verify(message, self)
    }

    pub fn zero() -> Self {
        Self([0u8; PUBLIC_KEY_SIZE])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A forging account's secret: an Ed25519 signing key plus its derived
/// `PublicKey`. Consumers outside the block-signing path treat this as an
/// opaque capability and never inspect its contents.
pub struct PrivateKey {
    public_key: PublicKey,
    signing_key_bytes: [u8; 32],
}

impl PrivateKey {
    /// Generate a new random key pair.
    pub fn generate() -> CryptoResult<Self> {
        use ed25519_dalek::{SigningKey, VerifyingKey};
        use rand::rngs::OsRng;

        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key: VerifyingKey = (&signing_key).into();

        Ok(Self {
            public_key: PublicKey::new(verifying_key.to_bytes()),
            signing_key_bytes: signing_key.to_bytes(),
        })
    }

    /// Reconstruct a key pair from raw Ed25519 signing key bytes.
    pub fn from_bytes(signing_key_bytes: [u8; 32]) -> CryptoResult<Self> {
        use ed25519_dalek::{SigningKey, VerifyingKey};

        let signing_key = SigningKey::from_bytes(&signing_key_bytes);
        let verifying_key: VerifyingKey = (&signing_key).into();

        Ok(Self {
            public_key: PublicKey::new(verifying_key.to_bytes()),
            signing_key_bytes,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> CryptoResult<Signature> {
        use ed25519_dalek::{Signature as Ed25519Sig, Signer, SigningKey};

        let signing_key = SigningKey::from_bytes(&self.signing_key_bytes);
        let signature: Ed25519Sig = signing_key.sign(message);
        Ok(Signature::new(signature.to_bytes().to_vec()))
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.signing_key_bytes.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("signing_key_bytes", &"[REDACTED]")
            .finish()
    }
}
