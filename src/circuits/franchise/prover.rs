use ark_bn254::{Bn254, Fr};
use ark_crypto_primitives::snark::SNARK;
use ark_groth16::{Groth16, Proof, ProvingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_std::rand::{CryptoRng, RngCore};
use tracing::debug;

use super::franchise_circuit::FranchiseCircuit;
use crate::{Constraint, Error};

/// Synthesizes `circuit` with its assignment and checks every R1CS constraint.
pub fn ensure_satisfied(circuit: FranchiseCircuit<Fr>) -> Result<(), Error> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone())?;
    if !cs.is_satisfied()? {
        return Err(Error::Unsatisfiable(Constraint::ConstraintSystem));
    }
    debug!(num_constraints = cs.num_constraints(), "witness satisfies the constraint system");
    Ok(())
}

/// Proves `circuit`, refusing any witness that breaks a constraint instead of
/// emitting a proof that cannot verify.
pub fn franchise_prove<R: RngCore + CryptoRng>(
    pk: &ProvingKey<Bn254>,
    circuit: FranchiseCircuit<Fr>,
    rng: &mut R,
) -> Result<Proof<Bn254>, Error> {
    circuit.check_witness()?;
    ensure_satisfied(circuit.clone())?;

    let proof = Groth16::<Bn254>::prove(pk, circuit, rng)?;

    Ok(proof)
}
