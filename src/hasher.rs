use ark_bn254::Fr;
use ark_crypto_primitives::crh::{poseidon::CRH, CRHScheme};
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;

use crate::circuits::franchise::poseidon_params::bn254_poseidon_params;
use crate::Error;

/// Hash oracle `H(field elements...) -> field element` used off-circuit.
///
/// Whatever implements this must agree with the in-circuit gadget, otherwise
/// roots, commitments and nullifiers computed here will never verify.
pub trait Hasher {
    fn hash(&self, inputs: &[Fr]) -> Result<Fr, Error>;
}

#[derive(Clone, Debug)]
pub struct PoseidonHasher {
    params: PoseidonConfig<Fr>,
}

impl PoseidonHasher {
    pub fn new(params: PoseidonConfig<Fr>) -> Self {
        Self { params }
    }

    pub fn bn254() -> Self {
        Self::new(bn254_poseidon_params())
    }

    pub fn params(&self) -> &PoseidonConfig<Fr> {
        &self.params
    }
}

impl Hasher for PoseidonHasher {
    fn hash(&self, inputs: &[Fr]) -> Result<Fr, Error> {
        CRH::<Fr>::evaluate(&self.params, inputs).map_err(|e| Error::Hash(e.to_string()))
    }
}

impl<H: Hasher + ?Sized> Hasher for &H {
    fn hash(&self, inputs: &[Fr]) -> Result<Fr, Error> {
        (**self).hash(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poseidon_is_deterministic_and_order_sensitive() {
        let hasher = PoseidonHasher::bn254();
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);

        assert_eq!(hasher.hash(&[a, b]).unwrap(), hasher.hash(&[a, b]).unwrap());
        assert_ne!(hasher.hash(&[a, b]).unwrap(), hasher.hash(&[b, a]).unwrap());
        assert_ne!(
            hasher.hash(&[a, b]).unwrap(),
            hasher.hash(&[a, b, Fr::from(0u64)]).unwrap()
        );
    }
}
