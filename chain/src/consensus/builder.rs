//! Block construction.
//!
//! The builder assembles and signs candidate blocks. Reading the clock is
//! its only side effect, and the clock is a collaborator parameter rather
//! than a global, so construction is fully testable with a virtual clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::crypto::{KeyError, Keypair};
use crate::merkle;
use crate::types::{Address, Block, BlockHeader, BlockSignature, PoaParams, Transaction};

/// Source of wall-clock timestamps.
pub trait Clock {
    /// Returns the current time as seconds since Unix epoch.
    fn now(&self) -> u64;
}

/// The system wall clock.
///
/// On error (system clock before epoch) this falls back to 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0))
            .as_secs()
    }
}

/// A clock pinned to a fixed instant, for tests and simulations.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Abstract transaction pool interface.
///
/// Consensus does not care how transactions are stored or gossiped; it
/// only needs a way to ask for a batch of transactions that fit into a
/// block. Implementations should respect `max_txs` and `max_bytes` as
/// soft limits.
pub trait TxPool {
    /// Selects a batch of transactions for inclusion in a block.
    fn select_for_block(&mut self, max_txs: usize, max_bytes: usize) -> Vec<Transaction>;
}

/// Builds and signs a block on top of a known predecessor.
///
/// The clock is read exactly once. The returned block commits to the
/// transaction list through its Merkle root, links to the supplied
/// predecessor hash, and carries the builder's signature over the header
/// hash as its only signature. The caller is responsible for `index` and
/// `prev_hash` being consistent with chain state.
pub fn new_block<C: Clock>(
    origin: Address,
    prev_hash: Vec<u8>,
    transactions: Vec<Transaction>,
    index: u64,
    keypair: &Keypair,
    consensus: PoaParams,
    clock: &C,
) -> Result<Block, KeyError> {
    let timestamp = clock.now();
    let merkle_root = merkle::transaction_root(&transactions);

    let header = BlockHeader {
        origin,
        prev_hash,
        merkle_root,
        timestamp,
        consensus,
    };

    let signature = BlockSignature {
        signature: keypair.sign(&header.hash())?,
        signer: keypair.address(),
    };

    Ok(Block::new(index, header, vec![signature], transactions))
}

/// Builds the genesis block.
///
/// Genesis carries the seed bytes verbatim in place of a predecessor
/// hash, commits to an empty transaction list, has no signatures, and
/// originates from the reserved zero address.
pub fn genesis_block(seed: &[u8], timestamp: u64, consensus: PoaParams) -> Block {
    let header = BlockHeader {
        origin: Address::zero(),
        prev_hash: seed.to_vec(),
        merkle_root: merkle::merkle_root(&[]),
        timestamp,
        consensus,
    };

    Block::new(0, header, Vec::new(), Vec::new())
}
