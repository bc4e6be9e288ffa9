//! Canonical binary codec for every consensus entity.
//!
//! Every entity has exactly one byte encoding; header hashes, signatures,
//! and persisted blobs are all derived from it, so the layout here is a
//! consensus rule:
//!
//! - integers are fixed-width big-endian,
//! - addresses are raw 32 bytes,
//! - variable byte strings carry a `u32` big-endian length prefix,
//! - sequences carry a `u32` big-endian count prefix,
//! - block signatures are encoded in their total order (signature bytes,
//!   then address), never in insertion order.
//!
//! Decoding is total: malformed input yields a [`CodecError`], and
//! [`decode_block`] rejects trailing bytes.

use std::fmt;

use crate::types::{
    Address, Block, BlockHeader, BlockSignature, Hash256, PoaParams, Transaction, HASH_LEN,
};

/// Error type returned when decoding malformed bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CodecError {
    /// Input ended before the current field was complete.
    UnexpectedEof { needed: usize, remaining: usize },
    /// Input continued past the end of the decoded entity.
    TrailingBytes(usize),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnexpectedEof { needed, remaining } => write!(
                f,
                "unexpected end of input: needed {needed} bytes, {remaining} remaining"
            ),
            CodecError::TrailingBytes(count) => {
                write!(f, "{count} trailing bytes after decoded block")
            }
        }
    }
}

impl std::error::Error for CodecError {}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

fn put_address(buf: &mut Vec<u8>, address: &Address) {
    buf.extend_from_slice(address.as_bytes());
}

fn put_poa(buf: &mut Vec<u8>, poa: &PoaParams) {
    put_u32(buf, poa.validators.len() as u32);
    for validator in &poa.validators {
        put_address(buf, validator);
    }
    put_u64(buf, poa.block_period);
    put_u64(buf, poa.generation_limit);
    put_u64(buf, poa.signing_limit);
    put_u64(buf, poa.threshold);
    put_u64(buf, poa.min_txs);
}

fn put_signature(buf: &mut Vec<u8>, signature: &BlockSignature) {
    put_bytes(buf, &signature.signature);
    put_address(buf, &signature.signer);
}

fn put_transaction(buf: &mut Vec<u8>, tx: &Transaction) {
    put_address(buf, &tx.sender);
    put_address(buf, &tx.recipient);
    put_u64(buf, tx.amount);
    put_u64(buf, tx.fee);
    put_u64(buf, tx.nonce);
    put_u64(buf, tx.timestamp);
    put_u64(buf, tx.ttl);
}

/// Encodes a block header: origin, prev hash, Merkle root, timestamp,
/// consensus parameters. The header hash is BLAKE3 over these bytes.
pub fn encode_header(header: &BlockHeader) -> Vec<u8> {
    let mut buf = Vec::new();
    put_address(&mut buf, &header.origin);
    put_bytes(&mut buf, &header.prev_hash);
    put_bytes(&mut buf, &header.merkle_root);
    put_u64(&mut buf, header.timestamp);
    put_poa(&mut buf, &header.consensus);
    buf
}

/// Encodes a transaction. The base-16 transaction hash is BLAKE3 over
/// these bytes.
pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    let mut buf = Vec::new();
    put_transaction(&mut buf, tx);
    buf
}

/// Encodes a whole block: index, header, sorted signature sequence,
/// transactions in list order. This is the persisted form.
pub fn encode_block(block: &Block) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u64(&mut buf, block.index);
    buf.extend_from_slice(&encode_header(&block.header));
    // Block::new keeps the signature vector sorted by (bytes, address),
    // so encoding in slice order is encoding in the total order.
    put_u32(&mut buf, block.signatures.len() as u32);
    for signature in &block.signatures {
        put_signature(&mut buf, signature);
    }
    put_u32(&mut buf, block.transactions.len() as u32);
    for tx in &block.transactions {
        put_transaction(&mut buf, tx);
    }
    buf
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.take(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(arr))
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(arr))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn read_address(&mut self) -> Result<Address, CodecError> {
        let bytes = self.take(HASH_LEN)?;
        let mut arr = [0u8; HASH_LEN];
        arr.copy_from_slice(bytes);
        Ok(Address(Hash256(arr)))
    }
}

fn read_poa(reader: &mut Reader<'_>) -> Result<PoaParams, CodecError> {
    let count = reader.read_u32()?;
    // The count is untrusted; push as we go rather than pre-allocating.
    let mut validators = Vec::new();
    for _ in 0..count {
        validators.push(reader.read_address()?);
    }
    let block_period = reader.read_u64()?;
    let generation_limit = reader.read_u64()?;
    let signing_limit = reader.read_u64()?;
    let threshold = reader.read_u64()?;
    let min_txs = reader.read_u64()?;
    Ok(PoaParams::new(
        validators,
        block_period,
        generation_limit,
        signing_limit,
        threshold,
        min_txs,
    ))
}

fn read_header(reader: &mut Reader<'_>) -> Result<BlockHeader, CodecError> {
    let origin = reader.read_address()?;
    let prev_hash = reader.read_bytes()?;
    let merkle_root = reader.read_bytes()?;
    let timestamp = reader.read_u64()?;
    let consensus = read_poa(reader)?;
    Ok(BlockHeader {
        origin,
        prev_hash,
        merkle_root,
        timestamp,
        consensus,
    })
}

fn read_signature(reader: &mut Reader<'_>) -> Result<BlockSignature, CodecError> {
    let signature = reader.read_bytes()?;
    let signer = reader.read_address()?;
    Ok(BlockSignature { signature, signer })
}

fn read_transaction(reader: &mut Reader<'_>) -> Result<Transaction, CodecError> {
    let sender = reader.read_address()?;
    let recipient = reader.read_address()?;
    let amount = reader.read_u64()?;
    let fee = reader.read_u64()?;
    let nonce = reader.read_u64()?;
    let timestamp = reader.read_u64()?;
    let ttl = reader.read_u64()?;
    Ok(Transaction {
        sender,
        recipient,
        amount,
        fee,
        nonce,
        timestamp,
        ttl,
    })
}

/// Decodes a block from its canonical encoding.
///
/// The whole input must be consumed; trailing bytes are an error.
pub fn decode_block(bytes: &[u8]) -> Result<Block, CodecError> {
    let mut reader = Reader::new(bytes);

    let index = reader.read_u64()?;
    let header = read_header(&mut reader)?;

    let signature_count = reader.read_u32()?;
    let mut signatures = Vec::new();
    for _ in 0..signature_count {
        signatures.push(read_signature(&mut reader)?);
    }

    let tx_count = reader.read_u32()?;
    let mut transactions = Vec::new();
    for _ in 0..tx_count {
        transactions.push(read_transaction(&mut reader)?);
    }

    if reader.remaining() > 0 {
        return Err(CodecError::TrailingBytes(reader.remaining()));
    }

    Ok(Block::new(index, header, signatures, transactions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle;

    fn dummy_address(byte: u8) -> Address {
        Address(Hash256([byte; HASH_LEN]))
    }

    fn dummy_poa() -> PoaParams {
        PoaParams::new(vec![dummy_address(3), dummy_address(7)], 5, 2, 2, 1, 0)
    }

    fn dummy_tx(nonce: u64) -> Transaction {
        Transaction {
            sender: dummy_address(1),
            recipient: dummy_address(2),
            amount: 100,
            fee: 1,
            nonce,
            timestamp: 1_000,
            ttl: 600,
        }
    }

    fn dummy_block(index: u64, prev_hash: Vec<u8>, txs: Vec<Transaction>) -> Block {
        let header = BlockHeader {
            origin: dummy_address(3),
            prev_hash,
            merkle_root: merkle::transaction_root(&txs),
            timestamp: 2_000,
            consensus: dummy_poa(),
        };
        let signatures = vec![
            BlockSignature {
                signature: vec![9u8; 65],
                signer: dummy_address(7),
            },
            BlockSignature {
                signature: vec![1u8; 65],
                signer: dummy_address(3),
            },
        ];
        Block::new(index, header, signatures, txs)
    }

    #[test]
    fn integers_encode_big_endian_fixed_width() {
        let mut buf = Vec::new();
        put_u64(&mut buf, 0x0102_0304_0506_0708);
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8]);

        let mut buf = Vec::new();
        put_u32(&mut buf, 0xdead_beef);
        assert_eq!(buf, [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn byte_strings_carry_a_length_prefix() {
        let mut buf = Vec::new();
        put_bytes(&mut buf, b"seed");
        assert_eq!(buf, [0, 0, 0, 4, b's', b'e', b'e', b'd']);
    }

    #[test]
    fn block_roundtrips() {
        let block = dummy_block(3, vec![8u8; HASH_LEN], vec![dummy_tx(0), dummy_tx(1)]);
        let bytes = encode_block(&block);
        let decoded = decode_block(&bytes).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn genesis_seed_roundtrips_verbatim() {
        // The genesis prev hash is an arbitrary-length seed, not a digest.
        let block = dummy_block(0, b"generation seed".to_vec(), vec![]);
        let decoded = decode_block(&encode_block(&block)).unwrap();
        assert_eq!(decoded.header.prev_hash, b"generation seed".to_vec());
    }

    #[test]
    fn signatures_encode_in_total_order() {
        let block = dummy_block(1, vec![0u8; HASH_LEN], vec![]);
        // Block::new sorted by (signature bytes, address): vec![1u8] first.
        assert_eq!(block.signatures[0].signature, vec![1u8; 65]);

        let decoded = decode_block(&encode_block(&block)).unwrap();
        assert_eq!(decoded.signatures, block.signatures);
    }

    #[test]
    fn builder_output_roundtrips_with_its_signature() {
        use crate::consensus::builder::{genesis_block, new_block, FixedClock};
        use crate::crypto::Keypair;

        let keypair = Keypair::generate();
        let poa = PoaParams::new(vec![keypair.address()], 5, 1, 1, 1, 0);
        let genesis = genesis_block(b"seed", 1_000, poa.clone());
        let b1 = new_block(
            keypair.address(),
            genesis.header_hash().as_bytes().to_vec(),
            vec![dummy_tx(0)],
            1,
            &keypair,
            poa,
            &FixedClock(2_000),
        )
        .unwrap();

        let decoded = decode_block(&encode_block(&b1)).unwrap();
        assert_eq!(decoded, b1);
        assert_eq!(decoded.signatures, b1.signatures);
        assert_eq!(decoded.header_hash(), b1.header_hash());

        let genesis_decoded = decode_block(&encode_block(&genesis)).unwrap();
        assert_eq!(genesis_decoded, genesis);
    }

    #[test]
    fn truncated_input_fails_with_eof() {
        let bytes = encode_block(&dummy_block(1, vec![0u8; HASH_LEN], vec![dummy_tx(0)]));
        let err = decode_block(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { .. }));
    }

    #[test]
    fn empty_input_fails_with_eof() {
        assert!(matches!(
            decode_block(&[]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_block(&dummy_block(1, vec![0u8; HASH_LEN], vec![]));
        bytes.push(0);
        assert_eq!(decode_block(&bytes).unwrap_err(), CodecError::TrailingBytes(1));
    }

    #[test]
    fn header_hash_differs_when_consensus_params_differ() {
        let mut a = dummy_block(1, vec![0u8; HASH_LEN], vec![]);
        let b = a.clone();
        a.header.consensus.threshold = 2;
        assert_ne!(a.header_hash(), b.header_hash());
    }
}
