pub mod franchise_circuit;
pub mod key_utils;
pub mod merkle_tree;
pub mod parser;
pub mod poseidon_params;
pub mod prover;
pub mod setup;
pub mod verifier;
mod test;

use ark_crypto_primitives::sponge::Absorb;
use ark_ff::PrimeField;

use crate::Error;

/// Builds a satisfiable circuit around a freshly fabricated voter and election,
/// for key generation and tests.
pub trait MockingCircuit<F>
where
    F: PrimeField + Absorb,
{
    type HashParam;
    type Output;

    fn generate_circuit<R: ark_std::rand::Rng>(
        hash_param: Self::HashParam,
        levels: usize,
        voting_weight: u64,
        factory_weight: u64,
        rng: &mut R,
    ) -> Result<Self::Output, Error>;
}
