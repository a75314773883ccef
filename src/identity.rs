//! Identity commitment (CIK) and nullifier derivation.
//!
//! Argument order is part of the protocol and matches the circuit:
//! `cik = H(address, password, signature)` and
//! `nullifier = H(signature, password, electionId[0], electionId[1])`.

use ark_bn254::Fr;

use crate::encoding::{encode_address, election_id, vote_hash, FieldEncoder, ADDRESS_LEN};
use crate::hasher::Hasher;
use crate::Error;

#[derive(Clone)]
pub struct Identity {
    pub address: [u8; ADDRESS_LEN],
    pub password: Vec<u8>,
    pub signature: Vec<u8>,
}

// password and signature never end up in logs
impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &hex::encode(self.address))
            .finish_non_exhaustive()
    }
}

/// An [`Identity`] mapped into the field, as the circuit receives it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncodedIdentity {
    pub address: Fr,
    pub password: Fr,
    pub signature: Fr,
}

impl Identity {
    pub fn new(address: &[u8], password: Vec<u8>, signature: Vec<u8>) -> Result<Self, Error> {
        encode_address::<Fr>(address)?;
        let mut fixed = [0u8; ADDRESS_LEN];
        fixed.copy_from_slice(address);
        Ok(Self {
            address: fixed,
            password,
            signature,
        })
    }

    pub fn encode(&self, encoder: &FieldEncoder) -> Result<EncodedIdentity, Error> {
        Ok(EncodedIdentity {
            address: encode_address(&self.address)?,
            password: encoder.encode(&self.password)?,
            signature: encoder.encode(&self.signature)?,
        })
    }
}

pub fn cik<H: Hasher>(hasher: &H, identity: &EncodedIdentity) -> Result<Fr, Error> {
    hasher.hash(&[identity.address, identity.password, identity.signature])
}

pub fn nullifier<H: Hasher>(
    hasher: &H,
    identity: &EncodedIdentity,
    election_id: &[Fr; 2],
) -> Result<Fr, Error> {
    hasher.hash(&[
        identity.signature,
        identity.password,
        election_id[0],
        election_id[1],
    ])
}

/// Public election values: the split election id and the split vote hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElectionContext {
    pub election_id: [Fr; 2],
    pub vote_hash: [Fr; 2],
}

impl ElectionContext {
    /// `raw_election_id` must be 32 bytes; the vote hash commits to `vote_weight`.
    pub fn new(raw_election_id: &[u8], vote_weight: u64) -> Result<Self, Error> {
        Ok(Self {
            election_id: election_id(raw_election_id)?,
            vote_hash: vote_hash(vote_weight),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::PoseidonHasher;

    fn identity() -> Identity {
        Identity::new(&[0xabu8; 20], b"p@ss".to_vec(), vec![0x3a; 65]).unwrap()
    }

    #[test]
    fn test_nullifier_is_per_election() {
        let hasher = PoseidonHasher::bn254();
        let encoded = identity().encode(&FieldEncoder::bn254()).unwrap();
        let first = ElectionContext::new(&[1u8; 32], 5).unwrap();
        let second = ElectionContext::new(&[2u8; 32], 5).unwrap();

        let n1 = nullifier(&hasher, &encoded, &first.election_id).unwrap();
        let n1_again = nullifier(&hasher, &encoded, &first.election_id).unwrap();
        let n2 = nullifier(&hasher, &encoded, &second.election_id).unwrap();
        assert_eq!(n1, n1_again);
        assert_ne!(n1, n2);
    }

    #[test]
    fn test_cik_binds_every_secret() {
        let hasher = PoseidonHasher::bn254();
        let encoder = FieldEncoder::bn254();
        let base = identity();
        let reference = cik(&hasher, &base.encode(&encoder).unwrap()).unwrap();

        let mut other = base.clone();
        other.password = b"p@st".to_vec();
        assert_ne!(cik(&hasher, &other.encode(&encoder).unwrap()).unwrap(), reference);

        let mut other = base.clone();
        other.signature[64] ^= 1;
        assert_ne!(cik(&hasher, &other.encode(&encoder).unwrap()).unwrap(), reference);

        let mut other = base;
        other.address[0] ^= 1;
        assert_ne!(cik(&hasher, &other.encode(&encoder).unwrap()).unwrap(), reference);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let shown = format!("{:?}", identity());
        assert!(shown.contains("abababab"));
        assert!(!shown.contains("p@ss"));
    }

    #[test]
    fn test_identity_requires_twenty_byte_address() {
        assert!(Identity::new(&[0u8; 32], vec![], vec![]).is_err());
    }
}
