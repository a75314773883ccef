use ark_bn254::Bn254;
use ark_crypto_primitives::snark::SNARK;
use ark_groth16::{Groth16, Proof, VerifyingKey};

use super::parser::PublicSignals;
use crate::Error;

pub fn franchise_verify(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    public_signals: &PublicSignals,
) -> Result<bool, Error> {
    let pvk = Groth16::<Bn254>::process_vk(vk)?;

    let verified =
        Groth16::<Bn254>::verify_with_processed_vk(&pvk, &public_signals.to_vec(), proof)?;

    Ok(verified)
}
