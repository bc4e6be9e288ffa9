//! RocksDB-backed block store.
//!
//! Persists blocks and chain-head metadata in a RocksDB instance with
//! dedicated column families:
//!
//! - `"blocks"`: maps the big-endian block index (8 bytes) to the
//!   canonical block bytes,
//! - `"meta"`:   stores the highest stored index under a fixed key
//!   `"tip"`, in the same big-endian form.

use std::{path::Path, sync::Arc};

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, Options, DB};

use crate::consensus::store::{BlockStore, StorageError};
use crate::types::Block;

const TIP_KEY: &[u8] = b"tip";

/// Configuration for [`RocksDbBlockStore`].
#[derive(Clone, Debug)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/chain-db".to_string(),
            create_if_missing: true,
        }
    }
}

/// RocksDB-backed implementation of [`BlockStore`].
pub struct RocksDbBlockStore {
    db: DB,
}

impl RocksDbBlockStore {
    /// Opens (or creates) a RocksDB-backed block store at the given path.
    ///
    /// This sets up the `"blocks"` and `"meta"` column families. The
    /// `"default"` column family is also created to keep RocksDB happy,
    /// but it is not otherwise used.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StorageError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new("blocks", Options::default()),
            ColumnFamilyDescriptor::new("meta", Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self { db })
    }

    fn cf_blocks(&self) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle("blocks")
            .ok_or(StorageError::MissingColumnFamily("blocks"))
    }

    fn cf_meta(&self) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle("meta")
            .ok_or(StorageError::MissingColumnFamily("meta"))
    }

    fn load_tip(&self) -> Result<Option<u64>, StorageError> {
        let cf_meta = self.cf_meta()?;
        match self.db.get_cf(&cf_meta, TIP_KEY)? {
            None => Ok(None),
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StorageError::CorruptedMeta("tip index length"))?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
        }
    }

    fn store_tip(&self, index: u64) -> Result<(), StorageError> {
        let cf_meta = self.cf_meta()?;
        self.db.put_cf(&cf_meta, TIP_KEY, index.to_be_bytes())?;
        Ok(())
    }
}

impl BlockStore for RocksDbBlockStore {
    fn get(&self, index: u64) -> Result<Option<Block>, StorageError> {
        let cf = self.cf_blocks()?;
        match self.db.get_cf(&cf, index.to_be_bytes())? {
            None => Ok(None),
            Some(bytes) => Ok(Some(super::decode_and_verify(index, &bytes)?)),
        }
    }

    fn put(&mut self, block: &Block) -> Result<(), StorageError> {
        let cf = self.cf_blocks()?;
        self.db
            .put_cf(&cf, block.index.to_be_bytes(), block.canonical_bytes())?;

        // The chain is an append-only log: the tip only moves forward.
        match self.load_tip()? {
            Some(tip) if tip >= block.index => {}
            _ => self.store_tip(block.index)?,
        }
        Ok(())
    }

    fn latest_index(&self) -> Result<Option<u64>, StorageError> {
        self.load_tip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::builder::{genesis_block, new_block, FixedClock};
    use crate::crypto::Keypair;
    use crate::types::PoaParams;
    use tempfile::TempDir;

    fn open_store(tmp: &TempDir) -> RocksDbBlockStore {
        let cfg = RocksDbConfig {
            path: tmp.path().to_string_lossy().to_string(),
            create_if_missing: true,
        };
        RocksDbBlockStore::open(&cfg).expect("open RocksDB")
    }

    #[test]
    fn rocksdb_store_roundtrips_blocks_and_tip() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut store = open_store(&tmp);

        let keypair = Keypair::generate();
        let poa = PoaParams::new(vec![keypair.address()], 5, 1, 1, 1, 0);
        let genesis = genesis_block(b"db seed", 1_000, poa.clone());
        let b1 = new_block(
            keypair.address(),
            genesis.header_hash().as_bytes().to_vec(),
            vec![],
            1,
            &keypair,
            poa,
            &FixedClock(2_000),
        )
        .unwrap();

        store.put(&genesis).unwrap();
        store.put(&b1).unwrap();

        assert_eq!(store.latest_index().unwrap(), Some(1));
        assert_eq!(store.get(0).unwrap().unwrap(), genesis);
        assert_eq!(store.get(1).unwrap().unwrap(), b1);
        assert!(store.get(2).unwrap().is_none());
    }

    #[test]
    fn tip_never_moves_backwards() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut store = open_store(&tmp);

        let keypair = Keypair::generate();
        let poa = PoaParams::new(vec![keypair.address()], 5, 1, 1, 1, 0);
        let genesis = genesis_block(b"db seed", 1_000, poa.clone());
        let b1 = new_block(
            keypair.address(),
            genesis.header_hash().as_bytes().to_vec(),
            vec![],
            1,
            &keypair,
            poa,
            &FixedClock(2_000),
        )
        .unwrap();

        store.put(&genesis).unwrap();
        store.put(&b1).unwrap();
        // Re-writing an old block must not rewind the tip.
        store.put(&genesis).unwrap();

        assert_eq!(store.latest_index().unwrap(), Some(1));
    }
}
