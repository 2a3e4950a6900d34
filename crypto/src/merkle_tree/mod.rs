mod binary_merkle_tree;

pub use binary_merkle_tree::{hash_leaf, hash_nodes, MerklePath, MerkleTree};

/// The number of bytes of a node digest.
pub const DIGEST_LEN: usize = 32;

/// A node of the Merkle tree, i.e., a SHA-256 digest.
pub type MerkleDigest = [u8; DIGEST_LEN];
