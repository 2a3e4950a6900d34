use crate::errors::{CryptoError, Result};
use crate::merkle_tree::MerkleDigest;
use ark_std::{cfg_chunks, cfg_iter, vec::Vec};
use digest::Digest;
use sha2::Sha256;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const LEAF_PREFIX: u8 = 0u8;
const NODE_PREFIX: u8 = 1u8;

/// Hash a leaf, domain-separated from the inner nodes.
pub fn hash_leaf(leaf: &[u8]) -> MerkleDigest {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(leaf);
    hasher.finalize().into()
}

/// Hash two children into their parent node.
pub fn hash_nodes(left: &MerkleDigest, right: &MerkleDigest) -> MerkleDigest {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// A binary Merkle tree over byte-string leaves.
///
/// The nodes are stored as a flattened array of layers, starting with the leaf digests
/// and ending with the root. The number of leaves must be a power of two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// Base-2 logarithm of the number of leaves.
    pub log_len: usize,
    nodes: Vec<MerkleDigest>,
}

/// The authentication path of a leaf, from the leaf level up to the children of the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// The sibling digests.
    pub siblings: Vec<MerkleDigest>,
}

impl MerkleTree {
    /// Build the tree. Each leaf is hashed on its own, leaves may have different lengths.
    pub fn new<T: AsRef<[u8]> + Sync>(leaves: &[T]) -> Result<Self> {
        if !leaves.len().is_power_of_two() {
            return Err(CryptoError::LeavesNotPowerOfTwo(leaves.len()));
        }
        let log_len = leaves.len().trailing_zeros() as usize;

        let mut nodes: Vec<MerkleDigest> = Vec::with_capacity((1 << (log_len + 1)) - 1);
        nodes.extend(cfg_iter!(leaves).map(|leaf| hash_leaf(leaf.as_ref())).collect::<Vec<_>>());

        let mut layer_start = 0;
        for depth in 0..log_len {
            let layer_len = 1 << (log_len - depth);
            let parents: Vec<MerkleDigest> =
                cfg_chunks!(nodes[layer_start..layer_start + layer_len], 2)
                    .map(|pair| hash_nodes(&pair[0], &pair[1]))
                    .collect();
            layer_start += layer_len;
            nodes.extend(parents);
        }

        Ok(Self { log_len, nodes })
    }

    /// Return the number of leaves.
    pub fn num_leaves(&self) -> usize {
        1 << self.log_len
    }

    /// Return the root digest.
    pub fn root(&self) -> MerkleDigest {
        // the node array holds at least one digest
        self.nodes[self.nodes.len() - 1]
    }

    /// Return the authentication path for the leaf at `index`.
    pub fn prove(&self, index: usize) -> Result<MerklePath> {
        if index >= self.num_leaves() {
            return Err(CryptoError::IndexOutOfRange {
                index,
                max: self.num_leaves() - 1,
            });
        }

        let mut siblings = Vec::with_capacity(self.log_len);
        let mut layer_start = 0;
        for depth in 0..self.log_len {
            let sibling = (index >> depth) ^ 1;
            siblings.push(self.nodes[layer_start + sibling]);
            layer_start += 1 << (self.log_len - depth);
        }
        Ok(MerklePath { siblings })
    }
}

impl MerklePath {
    /// Check that `leaf` sits at `index` in the tree committed by `root`.
    pub fn verify(&self, root: &MerkleDigest, index: usize, leaf: &[u8]) -> bool {
        if self.siblings.len() < usize::BITS as usize && index >> self.siblings.len() != 0 {
            return false;
        }

        let mut current = hash_leaf(leaf);
        for (depth, sibling) in self.siblings.iter().enumerate() {
            current = if (index >> depth) & 1 == 0 {
                hash_nodes(&current, sibling)
            } else {
                hash_nodes(sibling, &current)
            };
        }
        current == *root
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_std::vec;

    fn leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; 1 + i % 5]).collect()
    }

    #[test]
    fn test_mt() {
        let size = 32usize;
        let elements = leaves(size);
        let tree = MerkleTree::new(&elements).unwrap();
        let root = tree.root();
        assert_eq!(tree.num_leaves(), size);

        for (i, leaf) in elements.iter().enumerate() {
            let path = tree.prove(i).unwrap();
            assert_eq!(path.siblings.len(), 5);
            assert!(path.verify(&root, i, leaf));

            // wrong leaf
            let mut bad_leaf = leaf.clone();
            bad_leaf[0] ^= 1;
            assert!(!path.verify(&root, i, &bad_leaf));

            // wrong position
            assert!(!path.verify(&root, i ^ 1, leaf));
            assert!(!path.verify(&root, i + size, leaf));
        }

        let other = MerkleTree::new(&leaves(16)).unwrap();
        let path = tree.prove(3).unwrap();
        assert!(!path.verify(&other.root(), 3, &elements[3]));
    }

    #[test]
    fn test_single_leaf() {
        let tree = MerkleTree::new(&[b"only".to_vec()]).unwrap();
        assert_eq!(tree.root(), hash_leaf(b"only"));
        let path = tree.prove(0).unwrap();
        assert!(path.siblings.is_empty());
        assert!(path.verify(&tree.root(), 0, b"only"));
        assert!(!path.verify(&tree.root(), 1, b"only"));
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            MerkleTree::new(&leaves(6)),
            Err(CryptoError::LeavesNotPowerOfTwo(6))
        );
        assert!(MerkleTree::new::<Vec<u8>>(&[]).is_err());
        let tree = MerkleTree::new(&leaves(4)).unwrap();
        assert_eq!(
            tree.prove(4),
            Err(CryptoError::IndexOutOfRange { index: 4, max: 3 })
        );
    }

    #[test]
    fn test_leaf_node_separation() {
        let left = hash_leaf(b"a");
        let right = hash_leaf(b"b");
        let mut concat = left.to_vec();
        concat.extend_from_slice(&right);
        assert_ne!(hash_nodes(&left, &right), hash_leaf(&concat));
    }

    #[test]
    fn test_path_serialization() {
        let tree = MerkleTree::new(&leaves(8)).unwrap();
        let path = tree.prove(5).unwrap();
        assert_eq!(path.siblings.len(), 3);

        let json = serde_json::to_string(&path).unwrap();
        let path_json: MerklePath = serde_json::from_str(&json).unwrap();
        assert_eq!(path, path_json);

        let bin = bincode::serialize(&path).unwrap();
        let path_bin: MerklePath = bincode::deserialize(&bin).unwrap();
        assert_eq!(path, path_bin);
    }
}
