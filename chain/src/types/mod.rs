//! Core domain types used by the chain.
//!
//! This module defines the strongly-typed digest and address wrappers that
//! are shared across the block model, the validator, and storage. The goal
//! is to avoid "naked" byte buffers in public APIs and instead use
//! domain-specific newtypes.

use std::fmt;

/// Block, header, and signature model.
pub mod block;

/// Transaction record and validity predicate.
pub mod tx;

pub use block::{Block, BlockHeader, BlockSignature, PoaParams};
pub use tx::{Transaction, TxContext, TxError};

/// Length in bytes of all 256-bit hash types used in this module.
pub const HASH_LEN: usize = 32;

/// Strongly-typed 256-bit digest wrapper (BLAKE3-256).
///
/// This type backs every fixed-size hash in the chain: header hashes,
/// transaction hashes, and the address derivation. It is always exactly
/// [`HASH_LEN`] bytes long.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Hash256(pub [u8; HASH_LEN]);

impl Hash256 {
    /// Computes a new [`Hash256`] as the BLAKE3-256 digest of `data`.
    ///
    /// The result is deterministic for a given byte slice and is suitable
    /// as a content hash; it is **not** a password hash or KDF.
    pub fn compute(data: &[u8]) -> Self {
        let h = blake3::hash(data);
        Hash256(*h.as_bytes())
    }

    /// Returns the underlying 32-byte digest as a borrowed array.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Returns the digest as a base-16 string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Validator address, derived from a secp256k1 public key.
///
/// An address is the BLAKE3-256 digest of the compressed public key bytes
/// (see [`crate::crypto::address_of`]). The all-zero address is reserved
/// for the genesis origin, which no key can produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address(pub Hash256);

impl Address {
    /// The reserved all-zero address used as the genesis block origin.
    pub fn zero() -> Self {
        Address(Hash256([0u8; HASH_LEN]))
    }

    /// Returns the underlying digest backing this address.
    pub fn as_hash(&self) -> &Hash256 {
        &self.0
    }

    /// Returns the raw 32 address bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0 .0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}
