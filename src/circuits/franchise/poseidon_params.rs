use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;
use lazy_static::lazy_static;

pub const POSEIDON_RATE: usize = 2;
pub const POSEIDON_CAPACITY: usize = 1;
pub const FULL_ROUNDS: usize = 8;
pub const PARTIAL_ROUNDS: usize = 57;
pub const ALPHA: u64 = 5;

lazy_static! {
    static ref BN254_POSEIDON: PoseidonConfig<ark_bn254::Fr> = get_poseidon_params();
}

/// Width-3 Poseidon (rate 2, capacity 1, x^5) with Grain LFSR constants.
pub fn get_poseidon_params<F: PrimeField>() -> PoseidonConfig<F> {
    let (ark, mds) = find_poseidon_ark_and_mds::<F>(
        F::MODULUS_BIT_SIZE as u64,
        POSEIDON_RATE,
        FULL_ROUNDS as u64,
        PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig::new(
        FULL_ROUNDS,
        PARTIAL_ROUNDS,
        ALPHA,
        mds,
        ark,
        POSEIDON_RATE,
        POSEIDON_CAPACITY,
    )
}

/// Cached BN254 parameters; the LFSR search is too slow to repeat per proof.
pub fn bn254_poseidon_params() -> PoseidonConfig<ark_bn254::Fr> {
    BN254_POSEIDON.clone()
}
