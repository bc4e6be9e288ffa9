/// Node-local consensus tuning.
///
/// These are implementation-level limits applied when proposing blocks.
/// They are distinct from [`crate::types::PoaParams`], which travels
/// inside block headers and is consensus-critical.
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    /// Soft limit on the number of transactions selected per block.
    pub max_block_txs: usize,
    /// Hard limit on the canonical encoding size of a proposed block.
    pub max_block_size_bytes: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            max_block_txs: 10_000,
            max_block_size_bytes: 1_000_000,
        }
    }
}
