//! ECDSA key management for block signing.
//!
//! Authorities sign header hashes with secp256k1 keys. Signatures are
//! stored in recoverable form (one recovery-id byte followed by the
//! 64-byte compact signature), so a verifier can recover the public key
//! from a signature and the signed digest alone and derive the signer's
//! address from it. Addresses are the BLAKE3-256 digest of the compressed
//! public key bytes.

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use crate::types::{Address, Hash256};

/// Length in bytes of a stored signature: recovery id + compact form.
pub const SIGNATURE_LEN: usize = 65;

/// Errors that can occur during key operations.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Malformed signature bytes")]
    MalformedSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A signing key pair held by an authority.
///
/// The secret key material is erased when the pair is dropped; callers
/// borrow the pair for the duration of a signing call and must not copy
/// the secret out.
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Generates a new random key pair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Reconstructs a key pair from raw secret-key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Returns the public half of the pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the address derived from the public key.
    pub fn address(&self) -> Address {
        address_of(&self.public_key)
    }

    /// Signs a 32-byte digest, producing [`SIGNATURE_LEN`] signature bytes.
    pub fn sign(&self, digest: &Hash256) -> Result<Vec<u8>, KeyError> {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(digest.as_bytes())?;
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        Ok(serialize_signature(&signature))
    }
}

impl Drop for Keypair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

/// Derives the chain address of a public key.
pub fn address_of(public_key: &PublicKey) -> Address {
    Address(Hash256::compute(&public_key.serialize()))
}

/// Verifies signature bytes against a digest under a known public key.
pub fn verify(public_key: &PublicKey, signature: &[u8], digest: &Hash256) -> Result<bool, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest.as_bytes())?;
    let signature = parse_signature(signature)?.to_standard();
    Ok(secp.verify_ecdsa(&message, &signature, public_key).is_ok())
}

/// Recovers the public key that produced `signature` over `digest`.
pub fn recover(signature: &[u8], digest: &Hash256) -> Result<PublicKey, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest.as_bytes())?;
    let signature = parse_signature(signature)?;
    Ok(secp.recover_ecdsa(&message, &signature)?)
}

fn serialize_signature(signature: &RecoverableSignature) -> Vec<u8> {
    let (recovery_id, compact) = signature.serialize_compact();
    let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
    bytes.push(recovery_id.to_i32() as u8);
    bytes.extend_from_slice(&compact);
    bytes
}

fn parse_signature(bytes: &[u8]) -> Result<RecoverableSignature, KeyError> {
    if bytes.len() != SIGNATURE_LEN {
        return Err(KeyError::MalformedSignature);
    }
    let recovery_id =
        RecoveryId::from_i32(bytes[0] as i32).map_err(|_| KeyError::MalformedSignature)?;
    RecoverableSignature::from_compact(&bytes[1..], recovery_id)
        .map_err(|_| KeyError::MalformedSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let pair = Keypair::generate();
        let digest = Hash256::compute(b"header bytes");

        let signature = pair.sign(&digest).unwrap();
        assert_eq!(signature.len(), SIGNATURE_LEN);
        assert!(verify(pair.public_key(), &signature, &digest).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_digest() {
        let pair = Keypair::generate();
        let signature = pair.sign(&Hash256::compute(b"one")).unwrap();
        let other = Hash256::compute(b"two");
        assert!(!verify(pair.public_key(), &signature, &other).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let signer = Keypair::generate();
        let stranger = Keypair::generate();
        let digest = Hash256::compute(b"payload");
        let signature = signer.sign(&digest).unwrap();
        assert!(!verify(stranger.public_key(), &signature, &digest).unwrap());
    }

    #[test]
    fn recover_yields_the_signing_key() {
        let pair = Keypair::generate();
        let digest = Hash256::compute(b"payload");
        let signature = pair.sign(&digest).unwrap();

        let recovered = recover(&signature, &digest).unwrap();
        assert_eq!(recovered, *pair.public_key());
        assert_eq!(address_of(&recovered), pair.address());
    }

    #[test]
    fn address_derivation_is_deterministic() {
        let pair = Keypair::generate();
        assert_eq!(address_of(pair.public_key()), pair.address());
        assert_ne!(pair.address(), Address::zero());
    }

    #[test]
    fn keypair_rebuilds_from_secret_bytes() {
        let pair = Keypair::generate();
        let secret = pair.secret_key.secret_bytes();
        let rebuilt = Keypair::from_secret_bytes(&secret).unwrap();
        assert_eq!(rebuilt.address(), pair.address());
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let pair = Keypair::generate();
        let digest = Hash256::compute(b"payload");
        let signature = pair.sign(&digest).unwrap();
        assert!(matches!(
            verify(pair.public_key(), &signature[..64], &digest),
            Err(KeyError::MalformedSignature)
        ));
    }
}
