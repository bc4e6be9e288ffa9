//! In-memory block store.
//!
//! Keeps the canonical block blobs in a `BTreeMap` keyed by index, so the
//! chain head is simply the last key. Useful for unit tests, benchmarks,
//! and small devnets.

use std::collections::BTreeMap;

use crate::consensus::store::{BlockStore, StorageError};
use crate::types::Block;

/// In-memory implementation of [`BlockStore`].
#[derive(Default)]
pub struct InMemoryBlockStore {
    blobs: BTreeMap<u64, Vec<u8>>,
}

impl InMemoryBlockStore {
    /// Creates a new, empty in-memory block store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Returns `true` if no blocks are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, index: u64) -> Result<Option<Block>, StorageError> {
        match self.blobs.get(&index) {
            None => Ok(None),
            Some(bytes) => Ok(Some(super::decode_and_verify(index, bytes)?)),
        }
    }

    fn put(&mut self, block: &Block) -> Result<(), StorageError> {
        self.blobs.insert(block.index, block.canonical_bytes());
        Ok(())
    }

    fn latest_index(&self) -> Result<Option<u64>, StorageError> {
        Ok(self.blobs.keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::builder::genesis_block;
    use crate::types::{Address, Hash256, PoaParams, HASH_LEN};

    fn dummy_poa() -> PoaParams {
        PoaParams::new(vec![Address(Hash256([3u8; HASH_LEN]))], 5, 1, 1, 1, 0)
    }

    fn dummy_block(timestamp: u64) -> Block {
        genesis_block(b"mem seed", timestamp, dummy_poa())
    }

    #[test]
    fn put_and_get_roundtrip_through_the_canonical_encoding() {
        let mut store = InMemoryBlockStore::new();
        let block = dummy_block(1_000);

        store.put(&block).unwrap();
        let fetched = store.get(0).unwrap().expect("block should be present");

        assert_eq!(fetched, block);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_of_missing_index_is_none() {
        let store = InMemoryBlockStore::new();
        assert!(store.get(7).unwrap().is_none());
    }

    #[test]
    fn latest_index_tracks_the_highest_key() {
        let mut store = InMemoryBlockStore::new();
        assert_eq!(store.latest_index().unwrap(), None);

        let mut b0 = dummy_block(1_000);
        store.put(&b0).unwrap();
        assert_eq!(store.latest_index().unwrap(), Some(0));

        b0.index = 4;
        store.put(&b0).unwrap();
        assert_eq!(store.latest_index().unwrap(), Some(4));
    }

    #[test]
    fn put_is_idempotent() {
        let mut store = InMemoryBlockStore::new();
        let block = dummy_block(1_000);
        store.put(&block).unwrap();
        store.put(&block).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().unwrap(), block);
    }

    #[test]
    fn corrupt_blob_is_reported_not_returned() {
        let mut store = InMemoryBlockStore::new();
        let block = dummy_block(1_000);
        store.put(&block).unwrap();

        // Truncate the stored blob behind the store's back.
        let blob = store.blobs.get_mut(&0).unwrap();
        blob.truncate(blob.len() - 1);

        assert!(matches!(
            store.get(0),
            Err(StorageError::CorruptBlock { index: 0, .. })
        ));
    }

    #[test]
    fn blob_under_the_wrong_key_is_rejected() {
        let mut store = InMemoryBlockStore::new();
        let block = dummy_block(1_000);
        let bytes = block.canonical_bytes();
        store.blobs.insert(3, bytes);

        assert!(matches!(
            store.get(3),
            Err(StorageError::CorruptBlock { index: 3, .. })
        ));
    }
}
