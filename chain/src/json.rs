//! Non-authoritative JSON projection of blocks.
//!
//! The canonical binary encoding is the source of truth for hashing and
//! persistence; this projection exists for human inspection and tooling
//! only. Byte fields are rendered as base-16 strings. The projection is
//! one-way: there is no decoder back to domain types.

use serde::Serialize;

use crate::types::{Block, BlockHeader, BlockSignature, Transaction};

/// JSON view of a [`Block`].
#[derive(Debug, Serialize)]
pub struct BlockJson {
    pub header: HeaderJson,
    pub signatures: Vec<SignatureJson>,
    pub index: u64,
    pub transactions: Vec<TransactionJson>,
}

/// JSON view of a [`BlockHeader`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderJson {
    pub origin: String,
    pub prev_hash: String,
    pub merkle_root: String,
    pub timestamp: u64,
}

/// JSON view of a [`BlockSignature`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureJson {
    pub signature: String,
    pub signer_addr: String,
}

/// JSON view of a [`Transaction`].
#[derive(Debug, Serialize)]
pub struct TransactionJson {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
    pub timestamp: u64,
    pub ttl: u64,
}

impl From<&BlockHeader> for HeaderJson {
    fn from(header: &BlockHeader) -> Self {
        Self {
            origin: header.origin.to_string(),
            prev_hash: hex::encode(&header.prev_hash),
            merkle_root: hex::encode(&header.merkle_root),
            timestamp: header.timestamp,
        }
    }
}

impl From<&BlockSignature> for SignatureJson {
    fn from(signature: &BlockSignature) -> Self {
        Self {
            signature: hex::encode(&signature.signature),
            signer_addr: signature.signer.to_string(),
        }
    }
}

impl From<&Transaction> for TransactionJson {
    fn from(tx: &Transaction) -> Self {
        Self {
            sender: tx.sender.to_string(),
            recipient: tx.recipient.to_string(),
            amount: tx.amount,
            fee: tx.fee,
            nonce: tx.nonce,
            timestamp: tx.timestamp,
            ttl: tx.ttl,
        }
    }
}

impl From<&Block> for BlockJson {
    fn from(block: &Block) -> Self {
        Self {
            header: HeaderJson::from(&block.header),
            signatures: block.signatures.iter().map(SignatureJson::from).collect(),
            index: block.index,
            transactions: block
                .transactions
                .iter()
                .map(TransactionJson::from)
                .collect(),
        }
    }
}

/// Renders a block as a `serde_json` value.
pub fn block_to_json(block: &Block) -> serde_json::Value {
    // BlockJson contains no map keys or non-string values that can fail
    // to serialize, so this conversion is infallible in practice.
    serde_json::to_value(BlockJson::from(block)).unwrap_or(serde_json::Value::Null)
}
