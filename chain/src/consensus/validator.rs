//! Block and chain validation.
//!
//! Validation is a pure function over (candidate, predecessor, median
//! timestamp): it performs no I/O, holds no state, and short-circuits on
//! the first failing rule, returning the matching [`ValidationError`]
//! variant. Chain validation composes the single-block check into an
//! inductive property over an arbitrarily long history.

use crate::crypto;
use crate::merkle;
use crate::types::{Block, BlockSignature, TxContext};

use super::error::ValidationError;

/// Number of trailing blocks a timestamp median is computed over.
pub const MEDIAN_WINDOW: usize = 11;

/// Sorts blocks ascending by index.
pub fn sort_by_index(blocks: &mut [Block]) {
    blocks.sort_by_key(|b| b.index);
}

/// Computes the median timestamp of a window of blocks.
///
/// - An empty window is an error.
/// - A single block yields its own timestamp.
/// - Odd-length windows yield the middle timestamp of the sorted list;
///   even-length windows yield the mean of the two middle timestamps,
///   rounded half up.
pub fn median_timestamp(blocks: &[Block]) -> Result<u64, ValidationError> {
    median_of(blocks.iter().map(|b| b.header.timestamp).collect())
}

fn median_of(mut timestamps: Vec<u64>) -> Result<u64, ValidationError> {
    if timestamps.is_empty() {
        return Err(ValidationError::EmptyTimestampWindow);
    }
    timestamps.sort_unstable();

    let n = timestamps.len();
    let k = n / 2;
    if n % 2 == 1 {
        Ok(timestamps[k])
    } else {
        Ok((timestamps[k - 1] + timestamps[k] + 1) / 2)
    }
}

/// Verifies a detached block signature under a known public key.
pub fn verify_block_sig(
    public_key: &secp256k1::PublicKey,
    signature: &BlockSignature,
    block: &Block,
) -> Result<(), ValidationError> {
    let verified = crypto::verify(public_key, &signature.signature, &block.header_hash())
        .unwrap_or(false);
    if !verified {
        return Err(ValidationError::BadSignature {
            signer: signature.signer,
        });
    }
    Ok(())
}

/// Validates a candidate block against its predecessor.
///
/// Checks, in order, each short-circuiting:
///
/// 1. every transaction is valid at the candidate's timestamp;
/// 2. the declared Merkle root matches the transaction list;
/// 3. the timestamp strictly exceeds `median_ts`;
/// 4. the declared prev hash matches the predecessor's header hash;
/// 5. the index is one greater than the predecessor's;
/// 6. every signature recovers to a key whose address matches its signer,
///    and that signer is an authority;
/// 7. the origin is an authority.
///
/// The authority set is the PoA record carried in the candidate's header.
pub fn validate_block(
    median_ts: u64,
    predecessor: &Block,
    candidate: &Block,
) -> Result<(), ValidationError> {
    let ctx = TxContext {
        block_timestamp: candidate.header.timestamp,
    };
    for tx in &candidate.transactions {
        tx.validate(&ctx).map_err(|source| ValidationError::Transaction {
            index: candidate.index,
            source,
        })?;
    }

    let computed_root = merkle::transaction_root(&candidate.transactions);
    if computed_root != candidate.header.merkle_root {
        return Err(ValidationError::MerkleRootMismatch {
            index: candidate.index,
            computed: computed_root,
            declared: candidate.header.merkle_root.clone(),
        });
    }

    if candidate.header.timestamp <= median_ts {
        return Err(ValidationError::StaleTimestamp {
            timestamp: candidate.header.timestamp,
            median: median_ts,
        });
    }

    let parent_hash = predecessor.header_hash();
    if candidate.header.prev_hash != parent_hash.as_bytes() {
        return Err(ValidationError::PrevHashMismatch {
            declared: candidate.header.prev_hash.clone(),
            computed: parent_hash.as_bytes().to_vec(),
        });
    }

    let expected_index = predecessor.index + 1;
    if candidate.index != expected_index {
        return Err(ValidationError::NonSequentialIndex {
            expected: expected_index,
            found: candidate.index,
        });
    }

    let poa = &candidate.header.consensus;
    let header_hash = candidate.header_hash();
    for signature in &candidate.signatures {
        let recovered = crypto::recover(&signature.signature, &header_hash).map_err(|_| {
            ValidationError::BadSignature {
                signer: signature.signer,
            }
        })?;
        if crypto::address_of(&recovered) != signature.signer {
            return Err(ValidationError::BadSignature {
                signer: signature.signer,
            });
        }
        if !poa.contains(&signature.signer) {
            return Err(ValidationError::UnknownSigner {
                signer: signature.signer,
            });
        }
    }

    if !poa.contains(&candidate.header.origin) {
        return Err(ValidationError::UnknownOrigin {
            origin: candidate.header.origin,
        });
    }

    Ok(())
}

/// Validates an entire chain segment.
///
/// Blocks are ordered descending by index; each one is checked against
/// its next-lower-index predecessor with the median timestamp of the up
/// to [`MEDIAN_WINDOW`] consecutive blocks starting at it. The first
/// failure wins. The lowest block anchors the induction and is only used
/// as a predecessor.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ValidationError> {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by(|a, b| b.index.cmp(&a.index));

    for i in 0..ordered.len() {
        let Some(&predecessor) = ordered.get(i + 1) else {
            break;
        };
        let window_end = (i + MEDIAN_WINDOW).min(ordered.len());
        let median = median_of(
            ordered[i..window_end]
                .iter()
                .map(|b| b.header.timestamp)
                .collect(),
        )?;
        validate_block(median, predecessor, ordered[i])?;
    }
    Ok(())
}
