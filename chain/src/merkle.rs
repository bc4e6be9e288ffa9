//! Merkle commitment over ordered transaction hashes.
//!
//! The leaves are the bytes of the base-16-encoded transaction hashes,
//! not the raw digests; independent implementations must agree on this
//! for the roots to interoperate.

use crate::types::{Hash256, Transaction};

/// Computes the Merkle root of an ordered list of leaves.
///
/// - An empty list yields the empty-tree constant, `BLAKE3("")`.
/// - A single leaf is its own root.
/// - Otherwise adjacent nodes are paired, the last node is duplicated
///   when a level has odd length, and each parent is
///   `BLAKE3(left || right)`, until one root remains.
pub fn merkle_root(leaves: &[Vec<u8>]) -> Vec<u8> {
    if leaves.is_empty() {
        return Hash256::compute(b"").as_bytes().to_vec();
    }

    let mut level: Vec<Vec<u8>> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let mut data = pair[0].clone();
            if pair.len() == 2 {
                data.extend_from_slice(&pair[1]);
            } else {
                // Odd level: duplicate the last node.
                data.extend_from_slice(&pair[0]);
            }
            next.push(Hash256::compute(&data).as_bytes().to_vec());
        }
        level = next;
    }
    level.swap_remove(0)
}

/// Computes the Merkle root committing to a block's transaction list.
pub fn transaction_root(transactions: &[Transaction]) -> Vec<u8> {
    let leaves: Vec<Vec<u8>> = transactions
        .iter()
        .map(|tx| tx.hash_hex().into_bytes())
        .collect();
    merkle_root(&leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, HASH_LEN};

    fn leaf(text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    #[test]
    fn empty_list_yields_empty_tree_constant() {
        assert_eq!(merkle_root(&[]), Hash256::compute(b"").as_bytes().to_vec());
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let l = leaf("aabbcc");
        assert_eq!(merkle_root(&[l.clone()]), l);
    }

    #[test]
    fn two_leaves_hash_their_concatenation() {
        let a = leaf("aa");
        let b = leaf("bb");
        let expected = Hash256::compute(b"aabb").as_bytes().to_vec();
        assert_eq!(merkle_root(&[a, b]), expected);
    }

    #[test]
    fn odd_level_duplicates_the_last_leaf() {
        let a = leaf("aa");
        let b = leaf("bb");
        let c = leaf("cc");

        let ab = Hash256::compute(b"aabb").as_bytes().to_vec();
        let cc = Hash256::compute(b"cccc").as_bytes().to_vec();
        let mut top = ab.clone();
        top.extend_from_slice(&cc);
        let expected = Hash256::compute(&top).as_bytes().to_vec();

        assert_eq!(merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn root_depends_on_leaf_order() {
        let a = leaf("aa");
        let b = leaf("bb");
        assert_ne!(
            merkle_root(&[a.clone(), b.clone()]),
            merkle_root(&[b, a])
        );
    }

    #[test]
    fn transaction_root_uses_hex_hashes_as_leaves() {
        let tx = Transaction {
            sender: Address(Hash256([1u8; HASH_LEN])),
            recipient: Address(Hash256([2u8; HASH_LEN])),
            amount: 5,
            fee: 1,
            nonce: 0,
            timestamp: 1_000,
            ttl: 600,
        };
        let root = transaction_root(std::slice::from_ref(&tx));
        assert_eq!(root, tx.hash_hex().into_bytes());
    }
}
