//! Storage backends for the chain.
//!
//! This module provides concrete implementations of the
//! [`crate::consensus::store::BlockStore`] trait:
//!
//! - an in-memory store ([`mem::InMemoryBlockStore`]) suitable for tests
//!   and small simulations,
//! - a RocksDB-backed store ([`rocksdb::RocksDbBlockStore`]) for
//!   persistent validator nodes.
//!
//! Both persist the canonical block encoding and re-check a block's
//! integrity when reading it back: the blob must decode completely and
//! its transactions must still satisfy their validity predicate at the
//! block's own timestamp.

use crate::codec;
use crate::consensus::store::StorageError;
use crate::types::{Block, TxContext};

pub mod mem;
pub mod rocksdb;

pub use mem::InMemoryBlockStore;
pub use rocksdb::{RocksDbBlockStore, RocksDbConfig};

/// Decodes a stored blob and re-checks its integrity.
///
/// `index` is the storage key the blob was found under; it must match the
/// decoded block's index.
pub(crate) fn decode_and_verify(index: u64, bytes: &[u8]) -> Result<Block, StorageError> {
    let block = codec::decode_block(bytes).map_err(|e| StorageError::CorruptBlock {
        index,
        reason: e.to_string(),
    })?;

    if block.index != index {
        return Err(StorageError::CorruptBlock {
            index,
            reason: format!("blob decodes to block index {}", block.index),
        });
    }

    let ctx = TxContext {
        block_timestamp: block.header.timestamp,
    };
    for tx in &block.transactions {
        tx.validate(&ctx).map_err(|e| StorageError::CorruptBlock {
            index,
            reason: e.to_string(),
        })?;
    }

    Ok(block)
}
