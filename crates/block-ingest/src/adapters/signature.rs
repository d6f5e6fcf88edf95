//! Ed25519 producer signature verification

use crate::ports::SignatureVerifier;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verifies producer signatures with ed25519-dalek.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519SignatureVerifier;

impl SignatureVerifier for Ed25519SignatureVerifier {
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8; 32]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    #[test]
    fn test_verify_ed25519() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let public = key.verifying_key().to_bytes();
        let message = b"block header hash";
        let signature = key.sign(message).to_bytes();

        let verifier = Ed25519SignatureVerifier;
        assert!(verifier.verify(message, &signature, &public));
        assert!(!verifier.verify(b"other message", &signature, &public));
        assert!(!verifier.verify(message, &signature[..63], &public));

        let other = SigningKey::from_bytes(&[8u8; 32]).verifying_key().to_bytes();
        assert!(!verifier.verify(message, &signature, &other));
    }
}
