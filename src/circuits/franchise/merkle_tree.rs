use ark_crypto_primitives::{
    crh::{
        poseidon::constraints::{CRHGadget, CRHParametersVar},
        CRHSchemeGadget,
    },
    sponge::Absorb,
};
use ark_ff::PrimeField;
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Inclusion path of a compacted sparse Merkle tree with a fixed number of slots.
///
/// Only the first `used_depth` slots are hashed; the rest must be zero. The prover
/// hints `used_depth` as a boolean mask `enabled[i] = (i < used_depth)`, and the
/// gadget constrains the mask to be a prefix of ones of exactly that length.
pub struct VariablePathVar<F: PrimeField> {
    siblings: Vec<FpVar<F>>,
    used_depth: FpVar<F>,
    enabled: Vec<Boolean<F>>,
}

impl<F: PrimeField + Absorb> VariablePathVar<F> {
    pub fn new_witness(
        cs: ConstraintSystemRef<F>,
        levels: usize,
        siblings: Option<&[F]>,
        used_depth: Option<usize>,
    ) -> Result<Self, SynthesisError> {
        if siblings.map_or(false, |s| s.len() != levels) {
            return Err(SynthesisError::Unsatisfiable);
        }

        let mut sibling_vars = Vec::with_capacity(levels);
        for i in 0..levels {
            let sibling = siblings.map(|s| s[i]);
            sibling_vars.push(FpVar::new_witness(cs.clone(), || {
                sibling.ok_or(SynthesisError::AssignmentMissing)
            })?);
        }
        let used_depth_var = FpVar::new_witness(cs.clone(), || {
            used_depth
                .map(|d| F::from(d as u64))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let mut enabled = Vec::with_capacity(levels);
        for i in 0..levels {
            enabled.push(Boolean::new_witness(cs.clone(), || {
                used_depth.map(|d| i < d).ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        let path = Self {
            siblings: sibling_vars,
            used_depth: used_depth_var,
            enabled,
        };
        path.enforce_hint()?;
        Ok(path)
    }

    fn enforce_hint(&self) -> Result<(), SynthesisError> {
        let zero = FpVar::<F>::zero();

        // once disabled, every deeper level stays disabled
        for pair in self.enabled.windows(2) {
            pair[1]
                .and(&pair[0].not())?
                .enforce_equal(&Boolean::Constant(false))?;
        }

        let count = self
            .enabled
            .iter()
            .fold(FpVar::zero(), |acc, e| acc + FpVar::from(e.clone()));
        count.enforce_equal(&self.used_depth)?;

        for (sibling, enabled) in self.siblings.iter().zip(&self.enabled) {
            sibling.conditional_enforce_equal(&zero, &enabled.not())?;
        }
        Ok(())
    }

    /// Root reached from leaf `H(key, value, 1)`, taking `key_bits[i]` as the branch at level `i`.
    pub fn root(
        &self,
        hash_params: &CRHParametersVar<F>,
        key: &FpVar<F>,
        key_bits: &[Boolean<F>],
        value: &FpVar<F>,
    ) -> Result<FpVar<F>, SynthesisError> {
        if key_bits.len() < self.siblings.len() {
            return Err(SynthesisError::Unsatisfiable);
        }

        let leaf_input = [key.clone(), value.clone(), FpVar::one()];
        let mut current = CRHGadget::<F>::evaluate(hash_params, &leaf_input)?;

        for level in (0..self.siblings.len()).rev() {
            let sibling = &self.siblings[level];
            let bit = &key_bits[level];
            let left = bit.select(sibling, &current)?;
            let right = bit.select(&current, sibling)?;
            let hashed = CRHGadget::<F>::evaluate(hash_params, &[left, right])?;
            current = self.enabled[level].select(&hashed, &current)?;
        }
        Ok(current)
    }

    pub fn verify_membership(
        &self,
        hash_params: &CRHParametersVar<F>,
        root: &FpVar<F>,
        key: &FpVar<F>,
        key_bits: &[Boolean<F>],
        value: &FpVar<F>,
    ) -> Result<Boolean<F>, SynthesisError> {
        let computed = self.root(hash_params, key, key_bits, value)?;
        computed.is_eq(root)
    }
}
