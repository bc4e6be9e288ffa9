//! Storage abstraction used by the consensus engine.

use std::fmt;

use crate::types::Block;

/// Abstract storage interface for the append-only block log.
///
/// Blocks are keyed by index and persisted as their canonical encoding;
/// the serialized form is the source of truth. The interface is
/// intentionally small: the engine only needs get/put and a way to find
/// the current chain head.
pub trait BlockStore {
    /// Fetches the block at `index`, if present.
    ///
    /// Implementations decode the stored blob and re-check its integrity
    /// before returning it.
    fn get(&self, index: u64) -> Result<Option<Block>, StorageError>;

    /// Persists a block under its index.
    ///
    /// Idempotent for a given `(index, block)` pair.
    fn put(&mut self, block: &Block) -> Result<(), StorageError>;

    /// Returns the highest stored block index, if any.
    fn latest_index(&self) -> Result<Option<u64>, StorageError>;
}

/// Storage-level error type.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying RocksDB error.
    RocksDb(rocksdb::Error),
    /// Required column family was not found.
    MissingColumnFamily(&'static str),
    /// Corrupted or malformed metadata (e.g. tip index with wrong length).
    CorruptedMeta(&'static str),
    /// A stored blob failed decoding or its integrity recheck.
    CorruptBlock { index: u64, reason: String },
}

impl From<rocksdb::Error> for StorageError {
    fn from(e: rocksdb::Error) -> Self {
        StorageError::RocksDb(e)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::RocksDb(e) => write!(f, "rocksdb: {e}"),
            StorageError::MissingColumnFamily(name) => {
                write!(f, "missing column family '{name}'")
            }
            StorageError::CorruptedMeta(what) => write!(f, "corrupted metadata: {what}"),
            StorageError::CorruptBlock { index, reason } => {
                write!(f, "corrupt block {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}
