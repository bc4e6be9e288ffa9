//! Top-level configuration for a chain node.
//!
//! This module aggregates configuration for:
//!
//! - node-local consensus tuning (`ConsensusConfig`),
//! - the proof-of-authority parameter record (`PoaConfig`),
//! - storage (RocksDB path and creation flags),
//! - the metrics exporter (enable flag + listen address).
//!
//! The goal is a single `ChainConfig` struct that binaries can construct
//! from defaults, config files, or environment variables as needed.
//! `PoaConfig::build` is the only way to obtain a [`PoaParams`] record
//! from raw configuration: it validates the authority set and parameter
//! bounds before any block is built with them.

use std::fmt;
use std::net::SocketAddr;

use crate::consensus::ConsensusConfig;
use crate::storage::RocksDbConfig;
use crate::types::{Address, Hash256, PoaParams, HASH_LEN};

/// Raw proof-of-authority configuration, prior to validation.
///
/// Validator addresses are base-16 strings as they would appear in a
/// config file.
#[derive(Clone, Debug)]
pub struct PoaConfig {
    /// Authority addresses, hex-encoded (64 characters each).
    pub validators: Vec<String>,
    /// Target seconds between blocks.
    pub block_period_secs: u64,
    /// Upper bound on blocks a single authority may generate per round.
    pub generation_limit: u64,
    /// Upper bound on blocks a single authority may sign per round.
    pub signing_limit: u64,
    /// Number of authority signatures a block needs to be final.
    pub threshold: u64,
    /// Minimum number of transactions a proposed block must carry.
    pub min_txs: u64,
}

impl Default for PoaConfig {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
            block_period_secs: 5,
            generation_limit: 1,
            signing_limit: 1,
            threshold: 1,
            min_txs: 0,
        }
    }
}

impl PoaConfig {
    /// Validates the configuration and produces the [`PoaParams`] record.
    pub fn build(&self) -> Result<PoaParams, ConfigError> {
        if self.validators.is_empty() {
            return Err(ConfigError::EmptyValidatorSet);
        }
        if self.block_period_secs == 0 {
            return Err(ConfigError::ZeroBlockPeriod);
        }

        let mut validators = Vec::with_capacity(self.validators.len());
        for value in &self.validators {
            validators.push(parse_address(value)?);
        }

        let poa = PoaParams::new(
            validators,
            self.block_period_secs,
            self.generation_limit,
            self.signing_limit,
            self.threshold,
            self.min_txs,
        );

        // Bounds are checked against the deduplicated set.
        let count = poa.validators.len() as u64;
        if self.threshold == 0 || self.threshold > count {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.threshold,
                validators: count,
            });
        }

        Ok(poa)
    }
}

fn parse_address(value: &str) -> Result<Address, ConfigError> {
    let bytes = hex::decode(value).map_err(|_| ConfigError::InvalidValidatorAddress {
        value: value.to_string(),
    })?;
    let arr: [u8; HASH_LEN] =
        bytes
            .try_into()
            .map_err(|_| ConfigError::InvalidValidatorAddress {
                value: value.to_string(),
            })?;
    Ok(Address(Hash256(arr)))
}

/// Error type returned when configuration fails validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The validator list is empty.
    EmptyValidatorSet,
    /// The block period is zero.
    ZeroBlockPeriod,
    /// A validator entry is not 64 hex characters.
    InvalidValidatorAddress { value: String },
    /// The signature threshold is zero or exceeds the validator count.
    ThresholdOutOfRange { threshold: u64, validators: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyValidatorSet => {
                write!(f, "config error: validator set is empty")
            }
            ConfigError::ZeroBlockPeriod => {
                write!(f, "config error: block period must be positive")
            }
            ConfigError::InvalidValidatorAddress { value } => {
                write!(f, "config error: '{value}' is not a valid validator address")
            }
            ConfigError::ThresholdOutOfRange {
                threshold,
                validators,
            } => write!(
                f,
                "config error: threshold {threshold} out of range for {validators} validators"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9898"
            .parse()
            .expect("hard-coded metrics listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level configuration for a chain node.
#[derive(Clone, Debug, Default)]
pub struct ChainConfig {
    pub consensus: ConsensusConfig,
    pub poa: PoaConfig,
    pub storage: RocksDbConfig,
    pub metrics: MetricsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_address(byte: u8) -> String {
        hex::encode([byte; HASH_LEN])
    }

    #[test]
    fn default_poa_config_has_no_authorities() {
        assert_eq!(
            PoaConfig::default().build(),
            Err(ConfigError::EmptyValidatorSet)
        );
    }

    #[test]
    fn build_produces_a_sorted_deduplicated_set() {
        let cfg = PoaConfig {
            validators: vec![hex_address(9), hex_address(2), hex_address(9)],
            ..PoaConfig::default()
        };
        let poa = cfg.build().unwrap();
        assert_eq!(poa.validators.len(), 2);
        assert!(poa.validators[0] < poa.validators[1]);
        assert_eq!(poa.block_period, 5);
    }

    #[test]
    fn malformed_address_is_rejected() {
        let cfg = PoaConfig {
            validators: vec!["zz".to_string()],
            ..PoaConfig::default()
        };
        assert!(matches!(
            cfg.build(),
            Err(ConfigError::InvalidValidatorAddress { .. })
        ));
    }

    #[test]
    fn short_address_is_rejected() {
        let cfg = PoaConfig {
            validators: vec!["abcd".to_string()],
            ..PoaConfig::default()
        };
        assert!(matches!(
            cfg.build(),
            Err(ConfigError::InvalidValidatorAddress { .. })
        ));
    }

    #[test]
    fn threshold_must_fit_the_deduplicated_set() {
        let cfg = PoaConfig {
            validators: vec![hex_address(1), hex_address(1)],
            threshold: 2,
            ..PoaConfig::default()
        };
        assert_eq!(
            cfg.build(),
            Err(ConfigError::ThresholdOutOfRange {
                threshold: 2,
                validators: 1,
            })
        );
    }

    #[test]
    fn zero_block_period_is_rejected() {
        let cfg = PoaConfig {
            validators: vec![hex_address(1)],
            block_period_secs: 0,
            ..PoaConfig::default()
        };
        assert_eq!(cfg.build(), Err(ConfigError::ZeroBlockPeriod));
    }

    #[test]
    fn chain_config_default_aggregates_all_sections() {
        let cfg = ChainConfig::default();
        assert!(cfg.metrics.enabled);
        assert_eq!(cfg.consensus.max_block_txs, 10_000);
        assert!(cfg.storage.create_if_missing);
    }
}
