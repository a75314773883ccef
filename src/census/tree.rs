use ark_bn254::Fr;
use ark_ff::{One, Zero};

use crate::encoding::{field_from_le_bytes, FIELD_BYTES};
use crate::hasher::Hasher;
use crate::{Error, TreeError};

/// Key/value store behind a membership tree.
pub trait MembershipStore {
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error>;

    /// Siblings from the root down to the level where the walk for `key` stops,
    /// plus whether `key` is stored there.
    fn proof(&self, key: &[u8]) -> Result<(Vec<Fr>, bool), Error>;

    fn root(&self) -> Fr;
}

/// Bit `level` of the little-endian key: the branch taken at that depth.
pub fn key_bit(key: &[u8], level: usize) -> bool {
    key.get(level / 8)
        .map(|byte| (byte >> (level % 8)) & 1 == 1)
        .unwrap_or(false)
}

pub fn leaf_hash<H: Hasher>(hasher: &H, key: Fr, value: Fr) -> Result<Fr, Error> {
    hasher.hash(&[key, value, Fr::one()])
}

#[derive(Clone, Debug)]
enum Node {
    Empty,
    Leaf {
        key: [u8; FIELD_BYTES],
        hash: Fr,
    },
    Middle {
        left: Box<Node>,
        right: Box<Node>,
        hash: Fr,
    },
}

impl Node {
    fn hash(&self) -> Fr {
        match self {
            Node::Empty => Fr::zero(),
            Node::Leaf { hash, .. } | Node::Middle { hash, .. } => *hash,
        }
    }
}

/// In-memory compacted sparse Merkle tree.
///
/// A leaf sits at the shallowest level where its key prefix is unique, so a proof
/// carries only as many siblings as that level, never more than `max_levels`.
#[derive(Debug)]
pub struct SparseMerkleTree<'a, H: Hasher> {
    hasher: &'a H,
    max_levels: usize,
    root: Node,
}

impl<'a, H: Hasher> SparseMerkleTree<'a, H> {
    pub fn new(hasher: &'a H, max_levels: usize) -> Self {
        Self {
            hasher,
            max_levels,
            root: Node::Empty,
        }
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    fn canonical_key(key: &[u8]) -> Result<[u8; FIELD_BYTES], Error> {
        if key.len() > FIELD_BYTES {
            return Err(TreeError::KeyTooLong(FIELD_BYTES).into());
        }
        let mut padded = [0u8; FIELD_BYTES];
        padded[..key.len()].copy_from_slice(key);
        Ok(padded)
    }

    fn middle(&self, left: Node, right: Node) -> Result<Node, Error> {
        let hash = self.hasher.hash(&[left.hash(), right.hash()])?;
        Ok(Node::Middle {
            left: Box::new(left),
            right: Box::new(right),
            hash,
        })
    }

    fn insert(
        &self,
        node: &mut Node,
        leaf: Node,
        key: &[u8; FIELD_BYTES],
        level: usize,
    ) -> Result<(), Error> {
        match node {
            Node::Empty => {
                *node = leaf;
                Ok(())
            }
            Node::Leaf { key: existing, .. } => {
                if existing == key {
                    return Err(TreeError::DuplicateKey.into());
                }
                let existing = *existing;
                self.check_split_depth(&existing, key, level)?;
                let old = std::mem::replace(node, Node::Empty);
                *node = self.push_down(old, &existing, leaf, key, level)?;
                Ok(())
            }
            Node::Middle { left, right, hash } => {
                if key_bit(key, level) {
                    self.insert(right, leaf, key, level + 1)?;
                } else {
                    self.insert(left, leaf, key, level + 1)?;
                }
                *hash = self.hasher.hash(&[left.hash(), right.hash()])?;
                Ok(())
            }
        }
    }

    /// Two leaves split at `level` must diverge before `max_levels`.
    fn check_split_depth(
        &self,
        a: &[u8; FIELD_BYTES],
        b: &[u8; FIELD_BYTES],
        level: usize,
    ) -> Result<(), Error> {
        if (level..self.max_levels).any(|l| key_bit(a, l) != key_bit(b, l)) {
            Ok(())
        } else {
            Err(TreeError::MaxLevels(self.max_levels).into())
        }
    }

    /// Replaces the slot holding `old` at `level` by a subtree holding both leaves.
    fn push_down(
        &self,
        old: Node,
        old_key: &[u8; FIELD_BYTES],
        new: Node,
        new_key: &[u8; FIELD_BYTES],
        level: usize,
    ) -> Result<Node, Error> {
        match (key_bit(old_key, level), key_bit(new_key, level)) {
            (false, true) => self.middle(old, new),
            (true, false) => self.middle(new, old),
            (true, true) => {
                let child = self.push_down(old, old_key, new, new_key, level + 1)?;
                self.middle(Node::Empty, child)
            }
            (false, false) => {
                let child = self.push_down(old, old_key, new, new_key, level + 1)?;
                self.middle(child, Node::Empty)
            }
        }
    }
}

impl<'a, H: Hasher> MembershipStore for SparseMerkleTree<'a, H> {
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        let key = Self::canonical_key(key)?;
        let value: Fr = field_from_le_bytes(value)?;
        let hash = leaf_hash(self.hasher, field_from_le_bytes(&key)?, value)?;

        let mut root = std::mem::replace(&mut self.root, Node::Empty);
        let result = self.insert(&mut root, Node::Leaf { key, hash }, &key, 0);
        self.root = root;
        result
    }

    fn proof(&self, key: &[u8]) -> Result<(Vec<Fr>, bool), Error> {
        let key = Self::canonical_key(key)?;
        let mut siblings = Vec::new();
        let mut node = &self.root;
        let mut level = 0;
        loop {
            match node {
                Node::Empty => return Ok((siblings, false)),
                Node::Leaf { key: stored, .. } => return Ok((siblings, *stored == key)),
                Node::Middle { left, right, .. } => {
                    if key_bit(&key, level) {
                        siblings.push(left.hash());
                        node = right;
                    } else {
                        siblings.push(right.hash());
                        node = left;
                    }
                    level += 1;
                }
            }
        }
    }

    fn root(&self) -> Fr {
        self.root.hash()
    }
}
