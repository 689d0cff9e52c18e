// blockchain-crypto/src/signature.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Digital signature wrapper (Ed25519 only).
#[derive(Clone, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl Signature {
    /// Create a new signature
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get owned bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, crate::CryptoError> {
        let bytes = hex::decode(s)
            .map_err(|e| crate::CryptoError::DeserializationError(e.to_string()))?;
        Ok(Self::new(bytes))
    }

    /// Verify this signature is valid for the given message and public key
    pub fn verify(
        &self,
        message: &[u8],
        public_key: &crate::PublicKey,
    ) -> Result<bool, crate::CryptoError> {
        use ed25519_dalek::{Signature as Ed25519Sig, Verifier, VerifyingKey};

        let sig = Ed25519Sig::from_slice(&self.bytes)
            .map_err(|_| crate::CryptoError::InvalidSignature)?;

        let pk = VerifyingKey::from_bytes(public_key.as_bytes())
            .map_err(|_| crate::CryptoError::InvalidPublicKey)?;

        Ok(pk.verify(message, &sig).is_ok())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature({}...)",
            hex::encode(&self.bytes[..8.min(self.bytes.len())])
        )
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Signature {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrivateKey;

    #[test]
    fn test_signature_ed25519() {
        let keypair = PrivateKey::generate().unwrap();
        let message = b"Test message";

        let signature = keypair.sign(message).unwrap();
        assert!(signature.verify(message, keypair.public_key()).unwrap());

        let wrong_message = b"Wrong message";
        assert!(!signature.verify(wrong_message, keypair.public_key()).unwrap());
    }

    #[test]
    fn test_signature_hex() {
        let keypair = PrivateKey::generate().unwrap();
        let message = b"Test";
        let sig = keypair.sign(message).unwrap();

        let hex = sig.to_hex();
        let parsed = Signature::from_hex(&hex).unwrap();

        assert_eq!(sig, parsed);
    }
}
