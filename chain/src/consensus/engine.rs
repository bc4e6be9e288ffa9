//! High-level consensus engine orchestration.
//!
//! The engine wires a [`BlockStore`] to the builder and validator. It
//! exposes methods to bootstrap the genesis block, to propose new blocks
//! (for local leadership), and to import blocks (locally proposed or
//! received from peers) into the append-only chain.

use crate::consensus::builder::{self, Clock, TxPool};
use crate::consensus::config::ConsensusConfig;
use crate::consensus::error::ConsensusError;
use crate::consensus::store::BlockStore;
use crate::consensus::validator::{self, MEDIAN_WINDOW};
use crate::crypto::Keypair;
use crate::types::{Block, Hash256, PoaParams};

/// Consensus engine generic over the storage backend.
pub struct ConsensusEngine<S> {
    pub config: ConsensusConfig,
    poa: PoaParams,
    store: S,
}

impl<S> ConsensusEngine<S>
where
    S: BlockStore,
{
    /// Creates a new consensus engine.
    pub fn new(config: ConsensusConfig, poa: PoaParams, store: S) -> Self {
        Self { config, poa, store }
    }

    /// Returns a reference to the underlying block store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the underlying block store.
    ///
    /// Mainly useful for tests and tooling; consensus logic should
    /// normally go through [`ConsensusEngine::import_block`].
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Returns the PoA parameters this engine stamps into new blocks.
    pub fn poa(&self) -> &PoaParams {
        &self.poa
    }

    /// Returns the index of the chain head, if any.
    pub fn latest_index(&self) -> Result<Option<u64>, ConsensusError> {
        Ok(self.store.latest_index()?)
    }

    /// Returns the block at the chain head, if any.
    pub fn tip_block(&self) -> Result<Option<Block>, ConsensusError> {
        match self.store.latest_index()? {
            None => Ok(None),
            Some(index) => Ok(self.store.get(index)?),
        }
    }

    /// Ensures the chain has a genesis block and returns it.
    ///
    /// On an empty store this builds and persists the genesis block from
    /// `seed` and `timestamp`; otherwise the stored genesis is returned
    /// and the arguments are ignored.
    pub fn init_genesis(&mut self, seed: &[u8], timestamp: u64) -> Result<Block, ConsensusError> {
        if self.store.latest_index()?.is_some() {
            return self
                .store
                .get(0)?
                .ok_or(ConsensusError::MissingBlock { index: 0 });
        }
        let genesis = builder::genesis_block(seed, timestamp, self.poa.clone());
        self.store.put(&genesis)?;
        Ok(genesis)
    }

    /// Validates and imports a block into the chain.
    ///
    /// Used both for locally proposed blocks and blocks received from the
    /// network: the predecessor is fetched from the store, the median
    /// timestamp is derived from the trailing window of up to
    /// [`MEDIAN_WINDOW`] predecessors, the block is validated, and only
    /// then persisted.
    pub fn import_block(&mut self, block: Block) -> Result<Hash256, ConsensusError> {
        if block.index == 0 {
            return Err(ConsensusError::UnexpectedGenesis);
        }

        let prev_index = block.index - 1;
        let predecessor = self
            .store
            .get(prev_index)?
            .ok_or(ConsensusError::MissingBlock { index: prev_index })?;

        let mut window = Vec::with_capacity(MEDIAN_WINDOW);
        window.push(predecessor.clone());
        let mut index = prev_index;
        while index > 0 && window.len() < MEDIAN_WINDOW {
            index -= 1;
            window.push(
                self.store
                    .get(index)?
                    .ok_or(ConsensusError::MissingBlock { index })?,
            );
        }
        let median = validator::median_timestamp(&window)?;

        validator::validate_block(median, &predecessor, &block)?;

        let hash = block.header_hash();
        self.store.put(&block)?;
        Ok(hash)
    }

    /// Proposes a new block on top of the current tip.
    ///
    /// Selects transactions from the pool within the configured limits,
    /// enforces the PoA minimum-transaction policy, builds and signs the
    /// block, and imports it through the same path as remote blocks.
    pub fn propose_block<P, C>(
        &mut self,
        keypair: &Keypair,
        tx_pool: &mut P,
        clock: &C,
    ) -> Result<(Hash256, Block), ConsensusError>
    where
        P: TxPool,
        C: Clock,
    {
        let tip = self.tip_block()?.ok_or(ConsensusError::EmptyChain)?;

        let txs = tx_pool.select_for_block(self.config.max_block_txs, self.config.max_block_size_bytes);
        if (txs.len() as u64) < self.poa.min_txs {
            return Err(ConsensusError::NotEnoughTransactions {
                have: txs.len(),
                need: self.poa.min_txs,
            });
        }

        let block = builder::new_block(
            keypair.address(),
            tip.header_hash().as_bytes().to_vec(),
            txs,
            tip.index + 1,
            keypair,
            self.poa.clone(),
            clock,
        )?;

        let size = block.canonical_bytes().len();
        if size > self.config.max_block_size_bytes {
            return Err(ConsensusError::BlockTooLarge {
                size,
                limit: self.config.max_block_size_bytes,
            });
        }

        let hash = self.import_block(block.clone())?;
        Ok((hash, block))
    }
}
