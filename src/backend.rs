//! Proving backend behind the pipeline. Keys and proofs cross this boundary as
//! compressed `ark-serialize` bytes, so a backend can be swapped without touching
//! witness assembly.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_std::rand::{CryptoRng, RngCore};

use crate::circuits::franchise::franchise_circuit::FranchiseCircuit;
use crate::circuits::franchise::key_utils::{
    pk_from_bytes, proof_from_bytes, to_compressed_bytes, vk_from_bytes,
};
use crate::circuits::franchise::parser::{CircuitInputs, PublicSignals};
use crate::circuits::franchise::poseidon_params::bn254_poseidon_params;
use crate::circuits::franchise::prover::franchise_prove;
use crate::circuits::franchise::setup::franchise_setup;
use crate::circuits::franchise::verifier::franchise_verify;
use crate::Error;

pub trait ProofBackend {
    /// Returns `(proving_key, verifying_key)` for the backend's circuit depth.
    fn setup<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(Vec<u8>, Vec<u8>), Error>;

    fn prove(&self, proving_key: &[u8], inputs: &CircuitInputs) -> Result<Vec<u8>, Error>;

    fn verify(
        &self,
        verifying_key: &[u8],
        proof: &[u8],
        public_signals: &PublicSignals,
    ) -> Result<bool, Error>;
}

#[derive(Clone, Debug)]
pub struct Groth16Backend {
    levels: usize,
    hash_params: PoseidonConfig<Fr>,
}

impl Groth16Backend {
    pub fn new(levels: usize, hash_params: PoseidonConfig<Fr>) -> Self {
        Self {
            levels,
            hash_params,
        }
    }

    pub fn bn254(levels: usize) -> Self {
        Self::new(levels, bn254_poseidon_params())
    }

    pub fn levels(&self) -> usize {
        self.levels
    }
}

impl ProofBackend for Groth16Backend {
    fn setup<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(Vec<u8>, Vec<u8>), Error> {
        let circuit = FranchiseCircuit::blank(self.levels, self.hash_params.clone());
        let (pk, vk) = franchise_setup(circuit, rng)?;
        Ok((to_compressed_bytes(&pk)?, to_compressed_bytes(&vk)?))
    }

    fn prove(&self, proving_key: &[u8], inputs: &CircuitInputs) -> Result<Vec<u8>, Error> {
        let circuit = inputs.to_circuit(self.levels, self.hash_params.clone())?;
        let pk = pk_from_bytes(proving_key)?;

        let proof = franchise_prove(&pk, circuit, &mut rand::thread_rng())?;

        to_compressed_bytes(&proof)
    }

    fn verify(
        &self,
        verifying_key: &[u8],
        proof: &[u8],
        public_signals: &PublicSignals,
    ) -> Result<bool, Error> {
        let vk = vk_from_bytes(verifying_key)?;
        let proof = proof_from_bytes(proof)?;
        franchise_verify(&vk, &proof, public_signals)
    }
}
