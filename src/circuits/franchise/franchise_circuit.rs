use std::cmp::Ordering;

use ark_bn254::Fr;
use ark_crypto_primitives::{
    crh::{
        poseidon::constraints::{CRHGadget, CRHParametersVar},
        CRHSchemeGadget,
    },
    sponge::{poseidon::PoseidonConfig, Absorb},
};
use ark_ff::{PrimeField, Zero};
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use ark_std::rand::Rng;
use num_bigint::BigUint;

use crate::census::builder::replay_root;
use crate::circuits::franchise::merkle_tree::VariablePathVar;
use crate::circuits::franchise::parser::PublicSignals;
use crate::circuits::franchise::MockingCircuit;
use crate::encoding::{field_to_le_bytes, FieldEncoder};
use crate::hasher::PoseidonHasher;
use crate::identity::{cik, nullifier, EncodedIdentity, Identity};
use crate::pipeline::assemble_inputs;
use crate::{Constraint, EncodingError, Error};

#[derive(Clone, Debug, Default)]
pub struct FranchiseInstance<F: PrimeField> {
    pub election_id: Option<[F; 2]>,
    pub nullifier: Option<F>,
    pub factory_weight: Option<F>,
    pub vote_hash: Option<[F; 2]>,
    pub cik_root: Option<F>,
    pub census_root: Option<F>,
}

#[derive(Clone, Debug, Default)]
pub struct FranchiseWitness<F: PrimeField> {
    pub address: Option<F>,
    pub password: Option<F>,
    pub signature: Option<F>,
    pub voting_weight: Option<F>,
    pub cik_siblings: Option<Vec<F>>,
    pub cik_used_depth: Option<usize>,
    pub census_siblings: Option<Vec<F>>,
    pub census_used_depth: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct FranchiseCircuit<F: PrimeField + Absorb> {
    pub levels: usize,
    pub hash_params: PoseidonConfig<F>,
    pub instance: FranchiseInstance<F>,
    pub witness: FranchiseWitness<F>,
}

impl<F: PrimeField + Absorb> FranchiseCircuit<F> {
    pub fn new(
        levels: usize,
        hash_params: PoseidonConfig<F>,
        instance: FranchiseInstance<F>,
        witness: FranchiseWitness<F>,
    ) -> Self {
        Self {
            levels,
            hash_params,
            instance,
            witness,
        }
    }

    /// A circuit of the right shape with no assignment, enough for key generation.
    pub fn blank(levels: usize, hash_params: PoseidonConfig<F>) -> Self {
        Self::new(
            levels,
            hash_params,
            FranchiseInstance::default(),
            FranchiseWitness::default(),
        )
    }
}

impl<F: PrimeField + Absorb> ConstraintSynthesizer<F> for FranchiseCircuit<F> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> ark_relations::r1cs::Result<()> {
        let hash_params = CRHParametersVar::<F>::new_constant(cs.clone(), self.hash_params)?;
        let zero = FpVar::<F>::zero();

        // instance, in public signal order
        let election_id = self.instance.election_id;
        let election_id_0 = FpVar::<F>::new_input(cs.clone(), || {
            election_id.map(|e| e[0]).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let election_id_1 = FpVar::<F>::new_input(cs.clone(), || {
            election_id.map(|e| e[1]).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier = FpVar::<F>::new_input(cs.clone(), || {
            self.instance.nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let factory_weight = FpVar::<F>::new_input(cs.clone(), || {
            self.instance.factory_weight.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let vote_hash = self.instance.vote_hash;
        let vote_hash_0 = FpVar::<F>::new_input(cs.clone(), || {
            vote_hash.map(|v| v[0]).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let vote_hash_1 = FpVar::<F>::new_input(cs.clone(), || {
            vote_hash.map(|v| v[1]).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let cik_root = FpVar::<F>::new_input(cs.clone(), || {
            self.instance.cik_root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let census_root = FpVar::<F>::new_input(cs.clone(), || {
            self.instance.census_root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // witness
        let address = FpVar::<F>::new_witness(cs.clone(), || {
            self.witness.address.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let password = FpVar::<F>::new_witness(cs.clone(), || {
            self.witness.password.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let signature = FpVar::<F>::new_witness(cs.clone(), || {
            self.witness.signature.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let voting_weight = FpVar::<F>::new_witness(cs.clone(), || {
            self.witness.voting_weight.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let cik_path = VariablePathVar::new_witness(
            cs.clone(),
            self.levels,
            self.witness.cik_siblings.as_deref(),
            self.witness.cik_used_depth,
        )?;
        let census_path = VariablePathVar::new_witness(
            cs.clone(),
            self.levels,
            self.witness.census_siblings.as_deref(),
            self.witness.census_used_depth,
        )?;

        // Constraints

        // 1. Check voting_weight <= factory_weight
        voting_weight.enforce_cmp(&factory_weight, Ordering::Less, true)?;

        // 2. Check vote_hash limbs are non-zero
        vote_hash_0.enforce_not_equal(&zero)?;
        vote_hash_1.enforce_not_equal(&zero)?;

        // 3. Check CRH(address || password || signature) is in the CIK tree under address
        let address_bits = address.to_bits_le()?;
        if address_bits.len() < self.levels {
            return Err(SynthesisError::Unsatisfiable);
        }
        let path_bits = &address_bits[..self.levels];

        let hash_input = [address.clone(), password.clone(), signature.clone()];
        let cik = CRHGadget::<F>::evaluate(&hash_params, &hash_input)?;
        cik_path
            .verify_membership(&hash_params, &cik_root, &address, path_bits, &cik)?
            .enforce_equal(&Boolean::Constant(true))?;

        // 4. Check (address, factory_weight) is in the census tree
        census_path
            .verify_membership(&hash_params, &census_root, &address, path_bits, &factory_weight)?
            .enforce_equal(&Boolean::Constant(true))?;

        // 5. Check nullifier = CRH(signature || password || election_id)
        let hash_input = [signature, password, election_id_0, election_id_1];
        let nullifier_computed = CRHGadget::<F>::evaluate(&hash_params, &hash_input)?;
        nullifier_computed.enforce_equal(&nullifier)?;

        Ok(())
    }
}

impl FranchiseCircuit<Fr> {
    pub fn public_signals(&self) -> Result<PublicSignals, Error> {
        let instance = &self.instance;
        Ok(PublicSignals {
            election_id: instance.election_id.ok_or_else(missing)?,
            nullifier: instance.nullifier.ok_or_else(missing)?,
            factory_weight: instance.factory_weight.ok_or_else(missing)?,
            vote_hash: instance.vote_hash.ok_or_else(missing)?,
            cik_root: instance.cik_root.ok_or_else(missing)?,
            census_root: instance.census_root.ok_or_else(missing)?,
        })
    }

    /// Evaluates every constraint natively and names the first one the assignment breaks.
    pub fn check_witness(&self) -> Result<(), Error> {
        let hasher = PoseidonHasher::new(self.hash_params.clone());
        let signals = self.public_signals()?;
        let witness = &self.witness;
        let identity = EncodedIdentity {
            address: witness.address.ok_or_else(missing)?,
            password: witness.password.ok_or_else(missing)?,
            signature: witness.signature.ok_or_else(missing)?,
        };
        let voting_weight = witness.voting_weight.ok_or_else(missing)?;

        // 1.
        let half: BigUint = Fr::MODULUS_MINUS_ONE_DIV_TWO.into();
        let voting: BigUint = voting_weight.into();
        let factory: BigUint = signals.factory_weight.into();
        if voting > half || factory > half {
            return Err(Error::Unsatisfiable(Constraint::WeightRange));
        }
        if voting > factory {
            return Err(Error::Unsatisfiable(Constraint::WeightBound));
        }

        // 2.
        if signals.vote_hash.iter().any(Zero::is_zero) {
            return Err(Error::Unsatisfiable(Constraint::VoteHashZero));
        }

        // 3. and 4.
        let key = field_to_le_bytes(&identity.address);
        let cik_value = cik(&hasher, &identity)?;
        self.check_path(
            &hasher,
            &key,
            cik_value,
            signals.cik_root,
            witness.cik_siblings.as_deref(),
            witness.cik_used_depth,
            Constraint::CikMembership,
        )?;
        self.check_path(
            &hasher,
            &key,
            signals.factory_weight,
            signals.census_root,
            witness.census_siblings.as_deref(),
            witness.census_used_depth,
            Constraint::CensusMembership,
        )?;

        // 5.
        if nullifier(&hasher, &identity, &signals.election_id)? != signals.nullifier {
            return Err(Error::Unsatisfiable(Constraint::Nullifier));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn check_path(
        &self,
        hasher: &PoseidonHasher,
        key: &[u8],
        value: Fr,
        root: Fr,
        siblings: Option<&[Fr]>,
        used_depth: Option<usize>,
        membership: Constraint,
    ) -> Result<(), Error> {
        let siblings = siblings.ok_or_else(missing)?;
        let used_depth = used_depth.ok_or_else(missing)?;
        if siblings.len() != self.levels {
            return Err(EncodingError::SiblingCount {
                expected: self.levels,
                found: siblings.len(),
            }
            .into());
        }
        if used_depth > self.levels {
            return Err(Error::Unsatisfiable(Constraint::UsedDepth));
        }
        if siblings[used_depth..].iter().any(|s| !s.is_zero()) {
            return Err(Error::Unsatisfiable(Constraint::SiblingPadding));
        }
        if replay_root(hasher, key, value, siblings, used_depth)? != root {
            return Err(Error::Unsatisfiable(membership));
        }
        Ok(())
    }
}

fn missing() -> Error {
    SynthesisError::AssignmentMissing.into()
}

impl MockingCircuit<Fr> for FranchiseCircuit<Fr> {
    type HashParam = PoseidonConfig<Fr>;
    type Output = FranchiseCircuit<Fr>;

    fn generate_circuit<R: Rng>(
        hash_param: Self::HashParam,
        levels: usize,
        voting_weight: u64,
        factory_weight: u64,
        rng: &mut R,
    ) -> Result<Self::Output, Error> {
        let mut address = [0u8; 20];
        rng.fill(&mut address);
        let mut password = vec![0u8; 32];
        rng.fill(&mut password[..]);
        let mut signature = vec![0u8; 65];
        rng.fill(&mut signature[..]);
        let identity = Identity::new(&address, password, signature)?;
        let mut election_id = [0u8; 32];
        rng.fill(&mut election_id);

        let hasher = PoseidonHasher::new(hash_param.clone());
        let inputs = assemble_inputs(
            &hasher,
            &FieldEncoder::bn254(),
            levels,
            crate::config::DEFAULT_DECOYS,
            &identity,
            &election_id,
            voting_weight,
            factory_weight,
            rng,
        )?;
        inputs.to_circuit(levels, hash_param)
    }
}
