//! Block, header, and signature model.
//!
//! Blocks are immutable value types: once constructed, their canonical
//! encoding (and therefore their header hash) never changes. All hashing,
//! signing, and persistence goes through the canonical codec in
//! [`crate::codec`] to avoid format drift between nodes.

use crate::types::{Address, Hash256, Transaction};

/// Proof-of-authority parameters carried inside every block header.
///
/// The parameter record is part of the block's identity: it is included in
/// the canonical header encoding and therefore in the header hash.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PoaParams {
    /// Addresses permitted to sign and originate blocks.
    ///
    /// Kept sorted and deduplicated so the canonical encoding of the set
    /// is unique. Use [`PoaParams::new`] to construct.
    pub validators: Vec<Address>,
    /// Target seconds between blocks.
    pub block_period: u64,
    /// Upper bound on blocks a single authority may generate per round.
    pub generation_limit: u64,
    /// Upper bound on blocks a single authority may sign per round.
    pub signing_limit: u64,
    /// Number of authority signatures a block needs to be final.
    pub threshold: u64,
    /// Minimum number of transactions a proposed block must carry.
    pub min_txs: u64,
}

impl PoaParams {
    /// Builds a parameter record, canonicalising the validator set.
    pub fn new(
        mut validators: Vec<Address>,
        block_period: u64,
        generation_limit: u64,
        signing_limit: u64,
        threshold: u64,
        min_txs: u64,
    ) -> Self {
        validators.sort();
        validators.dedup();
        Self {
            validators,
            block_period,
            generation_limit,
            signing_limit,
            threshold,
            min_txs,
        }
    }

    /// Returns whether `address` is a member of the validator set.
    pub fn contains(&self, address: &Address) -> bool {
        self.validators.binary_search(address).is_ok()
    }
}

/// Block header: the hashed portion of a block.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlockHeader {
    /// Address of the authority that produced the block.
    pub origin: Address,
    /// Header hash of the predecessor block.
    ///
    /// For the genesis block this holds an externally supplied seed,
    /// stored verbatim, so its length is not fixed.
    pub prev_hash: Vec<u8>,
    /// Merkle root over the base-16 transaction hashes.
    pub merkle_root: Vec<u8>,
    /// Wall-clock timestamp, seconds since Unix epoch.
    pub timestamp: u64,
    /// Consensus parameters in force for this block.
    pub consensus: PoaParams,
}

impl BlockHeader {
    /// Computes the header hash: BLAKE3-256 over the canonical encoding.
    ///
    /// This digest is the block's identity; successors link to it through
    /// their `prev_hash`, and authorities sign it.
    pub fn hash(&self) -> Hash256 {
        Hash256::compute(&crate::codec::encode_header(self))
    }
}

/// A detached authority signature over a header hash.
///
/// Two signatures are equal iff both fields match. The derived `Ord`
/// compares signature bytes first, then the address — the total order the
/// canonical encoding sorts by.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BlockSignature {
    /// Recoverable ECDSA signature bytes (recovery id + compact form).
    pub signature: Vec<u8>,
    /// Address of the signing authority.
    pub signer: Address,
}

/// A block: an index, a header, authority signatures, and transactions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    /// Position in the chain; genesis is 0.
    pub index: u64,
    /// The hashed header.
    pub header: BlockHeader,
    /// Authority signatures over the header hash.
    ///
    /// Semantically a set; represented as a sorted, deduplicated vector so
    /// the canonical encoding is unique. [`Block::new`] canonicalises.
    pub signatures: Vec<BlockSignature>,
    /// Ordered transaction list. Order is part of the block's identity:
    /// it determines the Merkle root.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Assembles a block, canonicalising the signature set.
    pub fn new(
        index: u64,
        header: BlockHeader,
        mut signatures: Vec<BlockSignature>,
        transactions: Vec<Transaction>,
    ) -> Self {
        signatures.sort();
        signatures.dedup();
        Self {
            index,
            header,
            signatures,
            transactions,
        }
    }

    /// Returns the header hash identifying this block.
    pub fn header_hash(&self) -> Hash256 {
        self.header.hash()
    }

    /// Returns the canonical byte encoding of the whole block.
    ///
    /// This is the persisted form and the source of truth; any JSON
    /// rendering is for human inspection only.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        crate::codec::encode_block(self)
    }
}
