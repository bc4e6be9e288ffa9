//! Transaction record and standalone validity predicate.
//!
//! The consensus core only relies on two transaction operations: a stable
//! base-16 hash (which feeds the Merkle commitment) and a validity check
//! parameterised by the containing block's timestamp. This module provides
//! both on a minimal signed-value-transfer record.

use std::fmt;

use crate::types::{Address, Hash256};

/// Validation context handed to [`Transaction::validate`].
///
/// Carries the timestamp of the block the transaction appears in. The
/// predicate must not depend on anything else: it has no access to chain
/// state or sibling transactions.
#[derive(Clone, Copy, Debug)]
pub struct TxContext {
    /// Timestamp of the containing block, seconds since Unix epoch.
    pub block_timestamp: u64,
}

/// A value transfer between two accounts.
///
/// Transactions carry their own creation time and a time-to-live, so their
/// validity depends on the timestamp of the block that includes them: a
/// block may not include a transaction from its future, nor one whose
/// window has already closed.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Transaction {
    /// Account sending the funds.
    pub sender: Address,
    /// Account receiving the funds.
    pub recipient: Address,
    /// Amount to transfer; must be non-zero.
    pub amount: u64,
    /// Fee paid for inclusion.
    pub fee: u64,
    /// Anti-replay nonce relative to the sender account.
    pub nonce: u64,
    /// Creation time, seconds since Unix epoch.
    pub timestamp: u64,
    /// Seconds past `timestamp` during which the transaction stays valid.
    pub ttl: u64,
}

impl Transaction {
    /// Returns the stable base-16 transaction hash.
    ///
    /// This is the BLAKE3-256 digest of the canonical encoding, hex
    /// encoded. The hex form (not the raw digest) is what the Merkle
    /// commitment uses as its leaves.
    pub fn hash_hex(&self) -> String {
        Hash256::compute(&crate::codec::encode_transaction(self)).to_hex()
    }

    /// Checks the transaction against the block it would appear in.
    ///
    /// Valid iff the amount is non-zero and the block timestamp falls
    /// within `[timestamp, timestamp + ttl]`.
    pub fn validate(&self, ctx: &TxContext) -> Result<(), TxError> {
        if self.amount == 0 {
            return Err(TxError::ZeroAmount);
        }
        if ctx.block_timestamp < self.timestamp {
            return Err(TxError::NotYetValid {
                tx_timestamp: self.timestamp,
                block_timestamp: ctx.block_timestamp,
            });
        }
        if ctx.block_timestamp > self.timestamp.saturating_add(self.ttl) {
            return Err(TxError::Expired {
                tx_timestamp: self.timestamp,
                ttl: self.ttl,
                block_timestamp: ctx.block_timestamp,
            });
        }
        Ok(())
    }
}

/// Error type returned when a transaction fails its validity predicate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TxError {
    /// The transfer amount is zero.
    ZeroAmount,
    /// The containing block predates the transaction.
    NotYetValid {
        tx_timestamp: u64,
        block_timestamp: u64,
    },
    /// The transaction's validity window had closed at block time.
    Expired {
        tx_timestamp: u64,
        ttl: u64,
        block_timestamp: u64,
    },
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::ZeroAmount => write!(f, "transaction transfers a zero amount"),
            TxError::NotYetValid {
                tx_timestamp,
                block_timestamp,
            } => write!(
                f,
                "transaction created at {tx_timestamp} is newer than its block at {block_timestamp}"
            ),
            TxError::Expired {
                tx_timestamp,
                ttl,
                block_timestamp,
            } => write!(
                f,
                "transaction created at {tx_timestamp} with ttl {ttl} expired at block time {block_timestamp}"
            ),
        }
    }
}

impl std::error::Error for TxError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HASH_LEN;

    fn dummy_address(byte: u8) -> Address {
        Address(Hash256([byte; HASH_LEN]))
    }

    fn dummy_tx(timestamp: u64, ttl: u64) -> Transaction {
        Transaction {
            sender: dummy_address(1),
            recipient: dummy_address(2),
            amount: 100,
            fee: 1,
            nonce: 0,
            timestamp,
            ttl,
        }
    }

    #[test]
    fn tx_inside_window_is_valid() {
        let tx = dummy_tx(1_000, 600);
        let ctx = TxContext {
            block_timestamp: 1_300,
        };
        assert!(tx.validate(&ctx).is_ok());
    }

    #[test]
    fn tx_from_the_future_is_rejected() {
        let tx = dummy_tx(2_000, 600);
        let ctx = TxContext {
            block_timestamp: 1_999,
        };
        match tx.validate(&ctx) {
            Err(TxError::NotYetValid {
                tx_timestamp,
                block_timestamp,
            }) => {
                assert_eq!(tx_timestamp, 2_000);
                assert_eq!(block_timestamp, 1_999);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn expired_tx_is_rejected() {
        let tx = dummy_tx(1_000, 600);
        let ctx = TxContext {
            block_timestamp: 1_601,
        };
        match tx.validate(&ctx) {
            Err(TxError::Expired { ttl, .. }) => assert_eq!(ttl, 600),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let tx = dummy_tx(1_000, 600);
        assert!(tx
            .validate(&TxContext {
                block_timestamp: 1_000
            })
            .is_ok());
        assert!(tx
            .validate(&TxContext {
                block_timestamp: 1_600
            })
            .is_ok());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut tx = dummy_tx(1_000, 600);
        tx.amount = 0;
        assert_eq!(
            tx.validate(&TxContext {
                block_timestamp: 1_000
            }),
            Err(TxError::ZeroAmount)
        );
    }

    #[test]
    fn hash_is_stable_and_hex_encoded() {
        let tx = dummy_tx(1_000, 600);
        let h1 = tx.hash_hex();
        let h2 = tx.hash_hex();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), HASH_LEN * 2);
        assert!(h1.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_covers_every_field() {
        let base = dummy_tx(1_000, 600);
        let mut other = base.clone();
        other.nonce += 1;
        assert_ne!(base.hash_hex(), other.hash_hex());
    }
}
