//! Error types for validation, storage, and the consensus engine.

use std::fmt;

use crate::crypto::KeyError;
use crate::types::{Address, TxError};

/// Error type returned when a block fails validation.
///
/// The taxonomy is closed: every way a block can be rejected has exactly
/// one variant, and each variant carries enough context for the caller to
/// log the rejection. Validation never mutates state; errors are pure
/// return values and nothing is retried inside the core.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// A signature does not verify against the header hash, or its
    /// recovered key does not derive the embedded signer address.
    BadSignature { signer: Address },
    /// A signature's author is not a member of the validator set.
    UnknownSigner { signer: Address },
    /// The block origin is not a member of the validator set.
    UnknownOrigin { origin: Address },
    /// The declared predecessor hash does not match the predecessor's
    /// computed header hash.
    PrevHashMismatch {
        declared: Vec<u8>,
        computed: Vec<u8>,
    },
    /// The block timestamp does not exceed the trailing-window median.
    StaleTimestamp { timestamp: u64, median: u64 },
    /// A median was requested over an empty window.
    EmptyTimestampWindow,
    /// The declared Merkle root does not match the root computed from the
    /// transaction list.
    MerkleRootMismatch {
        index: u64,
        computed: Vec<u8>,
        declared: Vec<u8>,
    },
    /// A contained transaction failed its validity predicate.
    Transaction { index: u64, source: TxError },
    /// The block index is not one greater than its predecessor's.
    NonSequentialIndex { expected: u64, found: u64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BadSignature { signer } => {
                write!(f, "invalid block: signature attributed to {signer} does not verify")
            }
            ValidationError::UnknownSigner { signer } => {
                write!(f, "invalid block: signer {signer} is not an authority")
            }
            ValidationError::UnknownOrigin { origin } => {
                write!(f, "invalid block: origin {origin} is not an authority")
            }
            ValidationError::PrevHashMismatch { declared, computed } => write!(
                f,
                "invalid block: declared prev hash {} but predecessor hashes to {}",
                hex::encode(declared),
                hex::encode(computed)
            ),
            ValidationError::StaleTimestamp { timestamp, median } => write!(
                f,
                "invalid block: timestamp {timestamp} does not exceed window median {median}"
            ),
            ValidationError::EmptyTimestampWindow => {
                write!(f, "invalid block: median requested over an empty window")
            }
            ValidationError::MerkleRootMismatch {
                index,
                computed,
                declared,
            } => write!(
                f,
                "invalid block {}: merkle root {} declared but transactions commit to {}",
                index,
                hex::encode(declared),
                hex::encode(computed)
            ),
            ValidationError::Transaction { index, source } => {
                write!(f, "invalid block {index}: {source}")
            }
            ValidationError::NonSequentialIndex { expected, found } => write!(
                f,
                "invalid block: index {found} does not follow predecessor (expected {expected})"
            ),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidationError::Transaction { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// High-level errors that can occur in the consensus engine.
#[derive(Debug)]
pub enum ConsensusError {
    /// Underlying validation failure.
    Validation(ValidationError),
    /// Storage-related failure.
    Storage(crate::consensus::store::StorageError),
    /// Signing failure while building a block.
    Key(KeyError),
    /// A block needed for validation is not in the store.
    MissingBlock { index: u64 },
    /// The store holds no blocks yet; the chain must be initialised first.
    EmptyChain,
    /// Blocks at index 0 only enter the chain through genesis
    /// initialisation, never through import.
    UnexpectedGenesis,
    /// The transaction pool produced fewer transactions than the PoA
    /// parameters require per block.
    NotEnoughTransactions { have: usize, need: u64 },
    /// The proposed block exceeds the configured size limit.
    BlockTooLarge { size: usize, limit: usize },
}

impl From<ValidationError> for ConsensusError {
    fn from(e: ValidationError) -> Self {
        ConsensusError::Validation(e)
    }
}

impl From<crate::consensus::store::StorageError> for ConsensusError {
    fn from(e: crate::consensus::store::StorageError) -> Self {
        ConsensusError::Storage(e)
    }
}

impl From<KeyError> for ConsensusError {
    fn from(e: KeyError) -> Self {
        ConsensusError::Key(e)
    }
}

impl fmt::Display for ConsensusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusError::Validation(e) => write!(f, "{e}"),
            ConsensusError::Storage(e) => write!(f, "storage error: {e}"),
            ConsensusError::Key(e) => write!(f, "key error: {e}"),
            ConsensusError::MissingBlock { index } => {
                write!(f, "consensus error: block {index} not found in store")
            }
            ConsensusError::EmptyChain => {
                write!(f, "consensus error: chain has no genesis block")
            }
            ConsensusError::UnexpectedGenesis => {
                write!(f, "consensus error: genesis blocks cannot be imported")
            }
            ConsensusError::NotEnoughTransactions { have, need } => write!(
                f,
                "consensus error: pool yielded {have} transactions, PoA requires {need}"
            ),
            ConsensusError::BlockTooLarge { size, limit } => write!(
                f,
                "consensus error: block size {size} bytes exceeds limit {limit}"
            ),
        }
    }
}

impl std::error::Error for ConsensusError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Hash256, HASH_LEN};
    use std::error::Error as StdError;

    fn dummy_address(byte: u8) -> Address {
        Address(Hash256([byte; HASH_LEN]))
    }

    #[test]
    fn stale_timestamp_display_names_both_values() {
        let err = ValidationError::StaleTimestamp {
            timestamp: 4_999,
            median: 5_000,
        };
        assert_eq!(
            err.to_string(),
            "invalid block: timestamp 4999 does not exceed window median 5000"
        );
    }

    #[test]
    fn prev_hash_mismatch_display_is_hex() {
        let err = ValidationError::PrevHashMismatch {
            declared: vec![0xab],
            computed: vec![0xcd],
        };
        let msg = err.to_string();
        assert!(msg.contains("ab"), "unexpected message: {msg}");
        assert!(msg.contains("cd"), "unexpected message: {msg}");
    }

    #[test]
    fn consensus_error_wraps_validation_and_uses_same_message() {
        let v = ValidationError::UnknownOrigin {
            origin: dummy_address(1),
        };
        let message = v.to_string();
        let e: ConsensusError = v.into();
        assert_eq!(e.to_string(), message);
    }

    #[test]
    fn transaction_error_exposes_its_source() {
        let err = ValidationError::Transaction {
            index: 4,
            source: TxError::ZeroAmount,
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn types_implement_std_error() {
        fn assert_is_error<E: StdError>() {}

        assert_is_error::<ValidationError>();
        assert_is_error::<ConsensusError>();
    }
}
