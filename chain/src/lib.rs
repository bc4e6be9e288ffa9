//! Block and chain-validation core for a permissioned proof-of-authority
//! node.
//!
//! This crate provides:
//!
//! - strongly-typed domain types for blocks, headers, signatures, and
//!   transactions (`types`),
//! - cryptographic primitives: hashing, keypairs, recoverable signatures,
//!   and address derivation (`crypto`),
//! - the canonical binary codec every node must agree on (`codec`),
//! - the Merkle commitment over transaction hashes (`merkle`),
//! - block construction and pure block/chain validation (`consensus`),
//! - storage backends keyed by block index (`storage`),
//! - Prometheus-based metrics (`metrics`),
//! - a non-authoritative JSON projection (`json`),
//! - and top-level node configuration (`config`).
//!
//! Higher-level binaries compose these pieces into validator nodes,
//! simulators, and tooling.

pub mod codec;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod json;
pub mod merkle;
pub mod metrics;
pub mod storage;
pub mod types;

// Re-export top-level configuration types.
pub use config::{ChainConfig, ConfigError, MetricsConfig, PoaConfig};

// Re-export "core" consensus operations and traits.
pub use consensus::{
    genesis_block, median_timestamp, new_block, sort_by_index, validate_block, validate_chain,
    verify_block_sig, BlockStore, Clock, ConsensusConfig, ConsensusEngine, ConsensusError,
    FixedClock, StorageError, SystemClock, TxPool, ValidationError, MEDIAN_WINDOW,
};

// Re-export the codec entry points.
pub use codec::{decode_block, encode_block, encode_header, CodecError};

// Re-export crypto primitives.
pub use crypto::{address_of, recover, verify, KeyError, Keypair, SIGNATURE_LEN};

// Re-export the Merkle commitment.
pub use merkle::{merkle_root, transaction_root};

// Re-export storage backends.
pub use storage::{InMemoryBlockStore, RocksDbBlockStore, RocksDbConfig};

// Re-export the JSON projection.
pub use json::{block_to_json, BlockJson};

// Re-export metrics registry and exporter.
pub use metrics::{run_prometheus_http_server, ConsensusMetrics, MetricsRegistry};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the default block store backend.
pub type DefaultBlockStore = RocksDbBlockStore;

/// Type alias for the default consensus engine stack (RocksDB-backed).
pub type DefaultConsensusEngine = ConsensusEngine<DefaultBlockStore>;
