use ark_bn254::Fr;
use ark_ff::{One, Zero};
use ark_std::rand::Rng;
use tracing::debug;

use crate::census::tree::{key_bit, leaf_hash, MembershipStore, SparseMerkleTree};
use crate::encoding::{field_from_le_bytes, field_to_le_bytes};
use crate::hasher::Hasher;
use crate::{Error, TreeError};

/// Fixed-capacity inclusion proof: `siblings.len()` is the circuit depth and every
/// slot at or beyond `used_depth` is zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionProof {
    pub root: Fr,
    pub siblings: Vec<Fr>,
    pub used_depth: usize,
}

impl InclusionProof {
    pub fn levels(&self) -> usize {
        self.siblings.len()
    }

    /// Recomputes the root from `(key, value)` with the same level rule the circuit applies.
    pub fn replay<H: Hasher>(&self, hasher: &H, key: &[u8], value: Fr) -> Result<Fr, Error> {
        replay_root(hasher, key, value, &self.siblings, self.used_depth)
    }
}

/// Builds a fresh tree holding `(target_key, target_value)` and `decoys` random
/// entries, and returns the padded proof for the target.
pub fn build<H: Hasher, R: Rng>(
    hasher: &H,
    levels: usize,
    target_key: &[u8],
    target_value: Fr,
    decoys: usize,
    rng: &mut R,
) -> Result<InclusionProof, Error> {
    let mut tree = SparseMerkleTree::new(hasher, levels);
    tree.add(target_key, &field_to_le_bytes(&target_value))?;

    let decoy_value = field_to_le_bytes(&Fr::one());
    for _ in 0..decoys {
        insert_decoy(&mut tree, target_key, &decoy_value, rng)?;
    }

    let proof = extract_proof(&tree, target_key, levels)?;
    debug!(
        levels,
        decoys,
        used_depth = proof.used_depth,
        root = %proof.root,
        "membership tree built"
    );
    Ok(proof)
}

/// Fresh keys drawn for one decoy before the tree is declared too shallow.
pub const DECOY_ATTEMPTS: usize = 64;

/// Inserts one random decoy, redrawing its key while it lands too deep or on
/// another decoy. Drawing the target key itself is a hard error.
fn insert_decoy<H: Hasher, R: Rng>(
    tree: &mut SparseMerkleTree<'_, H>,
    target_key: &[u8],
    value: &[u8],
    rng: &mut R,
) -> Result<(), Error> {
    let mut key = vec![0u8; target_key.len().max(1)];
    for _ in 0..DECOY_ATTEMPTS {
        rng.fill(&mut key[..]);
        if significant(&key) == significant(target_key) {
            return Err(TreeError::DuplicateKey.into());
        }
        match tree.add(&key, value) {
            // a rejected insert leaves the tree untouched
            Err(Error::Tree(TreeError::MaxLevels(_) | TreeError::DuplicateKey)) => continue,
            result => return result,
        }
    }
    Err(TreeError::MaxLevels(tree.max_levels()).into())
}

// keys are zero-padded before storage, so trailing zero bytes never matter
fn significant(key: &[u8]) -> &[u8] {
    let end = key.iter().rposition(|b| *b != 0).map_or(0, |idx| idx + 1);
    &key[..end]
}

/// Asks `store` for the proof of `key` and pads it to `levels` slots.
pub fn extract_proof<S: MembershipStore>(
    store: &S,
    key: &[u8],
    levels: usize,
) -> Result<InclusionProof, Error> {
    let (siblings, exists) = store.proof(key)?;
    if !exists {
        return Err(TreeError::KeyNotFound.into());
    }
    let used_depth = siblings.len();
    Ok(InclusionProof {
        root: store.root(),
        siblings: pad_siblings(siblings, levels)?,
        used_depth,
    })
}

pub fn pad_siblings(mut siblings: Vec<Fr>, levels: usize) -> Result<Vec<Fr>, Error> {
    if siblings.len() > levels {
        return Err(TreeError::MaxLevels(levels).into());
    }
    siblings.resize(levels, Fr::zero());
    Ok(siblings)
}

/// Used depth of a compacted-tree proof: the deepest real sibling is never zero.
pub fn infer_used_depth(siblings: &[Fr]) -> usize {
    siblings
        .iter()
        .rposition(|s| !s.is_zero())
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

pub fn replay_root<H: Hasher>(
    hasher: &H,
    key: &[u8],
    value: Fr,
    siblings: &[Fr],
    used_depth: usize,
) -> Result<Fr, Error> {
    if used_depth > siblings.len() {
        return Err(TreeError::MaxLevels(siblings.len()).into());
    }
    let mut current = leaf_hash(hasher, field_from_le_bytes(key)?, value)?;
    for level in (0..used_depth).rev() {
        let sibling = siblings[level];
        current = if key_bit(key, level) {
            hasher.hash(&[sibling, current])?
        } else {
            hasher.hash(&[current, sibling])?
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::PoseidonHasher;
    use ark_std::rand::{
        rngs::{mock::StepRng, StdRng},
        SeedableRng,
    };
    use proptest::prelude::*;

    const LEVELS: usize = 32;

    #[test]
    fn test_build_pads_and_replays() {
        let hasher = PoseidonHasher::bn254();
        let mut rng = StdRng::seed_from_u64(7);
        let key = [0xabu8; 20];
        let value = Fr::from(10u64);

        let proof = build(&hasher, LEVELS, &key, value, 10, &mut rng).unwrap();
        assert_eq!(proof.levels(), LEVELS);
        assert!(proof.used_depth <= LEVELS);
        assert!(proof.siblings[proof.used_depth..].iter().all(|s| s.is_zero()));
        assert_eq!(proof.replay(&hasher, &key, value).unwrap(), proof.root);
        assert_eq!(infer_used_depth(&proof.siblings), proof.used_depth);
    }

    #[test]
    fn test_replay_rejects_wrong_value() {
        let hasher = PoseidonHasher::bn254();
        let mut rng = StdRng::seed_from_u64(8);
        let key = [0x11u8; 20];

        let proof = build(&hasher, LEVELS, &key, Fr::from(3u64), 5, &mut rng).unwrap();
        assert_ne!(proof.replay(&hasher, &key, Fr::from(4u64)).unwrap(), proof.root);
    }

    #[test]
    fn test_without_decoys_root_is_leaf() {
        let hasher = PoseidonHasher::bn254();
        let mut rng = StdRng::seed_from_u64(9);
        let key = [0x22u8; 20];

        let proof = build(&hasher, LEVELS, &key, Fr::from(1u64), 0, &mut rng).unwrap();
        assert_eq!(proof.used_depth, 0);
        assert!(proof.siblings.iter().all(|s| s.is_zero()));
    }

    #[test]
    fn test_missing_key_is_a_tree_violation() {
        let hasher = PoseidonHasher::bn254();
        let mut tree = SparseMerkleTree::new(&hasher, LEVELS);
        tree.add(&[1u8; 20], &[1u8]).unwrap();

        assert!(matches!(
            extract_proof(&tree, &[2u8; 20], LEVELS),
            Err(Error::Tree(TreeError::KeyNotFound))
        ));
    }

    #[test]
    fn test_pad_rejects_overlong_paths() {
        assert!(pad_siblings(vec![Fr::one(); 5], 4).is_err());
        assert_eq!(pad_siblings(vec![Fr::one(); 2], 4).unwrap().len(), 4);
    }

    #[test]
    fn test_shallow_trees_redraw_decoys() {
        let hasher = PoseidonHasher::bn254();
        let key = [0x6du8; 20];
        let value = Fr::from(10u64);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let proof = build(&hasher, 8, &key, value, 10, &mut rng).unwrap();
            assert!(proof.used_depth <= 8);
            assert_eq!(proof.replay(&hasher, &key, value).unwrap(), proof.root);
        }
    }

    #[test]
    fn test_decoy_on_target_key_is_a_tree_violation() {
        let hasher = PoseidonHasher::bn254();
        // every drawn byte is zero, so the first decoy is the target itself
        let mut rng = StepRng::new(0, 0);

        assert!(matches!(
            build(&hasher, LEVELS, &[0u8; 20], Fr::one(), 1, &mut rng),
            Err(Error::Tree(TreeError::DuplicateKey))
        ));
    }

    #[test]
    fn test_full_tree_gives_up() {
        let hasher = PoseidonHasher::bn254();
        let mut rng = StdRng::seed_from_u64(10);

        // depth 1 holds two leaves at most
        assert!(matches!(
            build(&hasher, 1, &[0x01u8; 20], Fr::one(), 2, &mut rng),
            Err(Error::Tree(TreeError::MaxLevels(1)))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_built_proof_replays_to_root(
            seed in any::<u64>(),
            levels in 4usize..=40,
            decoys in 0usize..10,
            key in any::<[u8; 20]>(),
            value in any::<u64>(),
        ) {
            let hasher = PoseidonHasher::bn254();
            let mut rng = StdRng::seed_from_u64(seed);
            let value = Fr::from(value);

            let proof = build(&hasher, levels, &key, value, decoys, &mut rng).unwrap();
            prop_assert_eq!(proof.levels(), levels);
            prop_assert!(proof.used_depth <= levels);
            prop_assert!(proof.siblings[proof.used_depth..].iter().all(|s| s.is_zero()));
            prop_assert_eq!(infer_used_depth(&proof.siblings), proof.used_depth);
            prop_assert_eq!(proof.replay(&hasher, &key, value).unwrap(), proof.root);
        }
    }
}
