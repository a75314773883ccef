use ark_bn254::{Bn254, Fr};
use ark_crypto_primitives::snark::SNARK;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_std::rand::{CryptoRng, RngCore};
use tracing::info;

use super::franchise_circuit::FranchiseCircuit;
use crate::Error;

/// Circuit-specific Groth16 key generation. Only the shape of `circuit` matters:
/// its `levels` fixes the depth every later proof must use.
pub fn franchise_setup<R: RngCore + CryptoRng>(
    circuit: FranchiseCircuit<Fr>,
    rng: &mut R,
) -> Result<(ProvingKey<Bn254>, VerifyingKey<Bn254>), Error> {
    let levels = circuit.levels;

    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)?;

    info!(levels, public_inputs = vk.gamma_abc_g1.len() - 1, "groth16 keys generated");
    Ok((pk, vk))
}
