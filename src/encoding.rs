//! Byte-to-field conversions shared by the witness builder and the JSON boundary.
//!
//! Two integer conventions coexist and must not be mixed up:
//! - secrets (password, signature) are read **big-endian** by [`FieldEncoder`];
//! - tree keys, tree values, addresses and the two hash limbs are read **little-endian**,
//!   so that bit `i` of the field element is the tree path bit at level `i`.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use crate::{EncodingError, Error};

pub const ADDRESS_LEN: usize = 20;
pub const FIELD_BYTES: usize = 32;

/// Maps arbitrary byte strings into `[0, q)`.
///
/// The value `q` itself encodes to 0, exactly like the all-zero input. A zero
/// encoding is therefore ambiguous and must not be read as "the secret was zero".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEncoder {
    modulus: BigUint,
}

impl FieldEncoder {
    pub fn new(modulus: BigUint) -> Self {
        Self { modulus }
    }

    /// Encoder for the scalar field of `F`.
    pub fn for_field<F: PrimeField>() -> Self {
        Self::new(F::MODULUS.into())
    }

    pub fn bn254() -> Self {
        Self::for_field::<ark_bn254::Fr>()
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn encode_uint(&self, bytes: &[u8]) -> BigUint {
        let value = BigUint::from_bytes_be(bytes);
        if value == self.modulus {
            BigUint::default()
        } else if value < self.modulus {
            value
        } else {
            value % &self.modulus
        }
    }

    pub fn encode<F: PrimeField>(&self, bytes: &[u8]) -> Result<F, Error> {
        let field_modulus: BigUint = F::MODULUS.into();
        if field_modulus != self.modulus {
            return Err(EncodingError::ModulusMismatch.into());
        }
        Ok(F::from(self.encode_uint(bytes)))
    }
}

/// SHA-256 of `bytes` split into two 128-bit limbs, each half read little-endian.
/// `limb[0]` comes from the first 16 digest bytes.
pub fn split<F: PrimeField>(bytes: &[u8]) -> [F; 2] {
    let digest = Sha256::digest(bytes);
    [
        F::from_le_bytes_mod_order(&digest[..16]),
        F::from_le_bytes_mod_order(&digest[16..]),
    ]
}

/// Vote hash of a weight: [`split`] over its minimal big-endian bytes (empty for 0).
pub fn vote_hash<F: PrimeField>(weight: u64) -> [F; 2] {
    split(&minimal_be_bytes(weight))
}

fn minimal_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

pub fn election_id<F: PrimeField>(raw: &[u8]) -> Result<[F; 2], Error> {
    if raw.len() != FIELD_BYTES {
        return Err(EncodingError::InvalidLength {
            expected: FIELD_BYTES,
            found: raw.len(),
        }
        .into());
    }
    Ok(split(raw))
}

pub fn encode_address<F: PrimeField>(address: &[u8]) -> Result<F, Error> {
    if address.len() != ADDRESS_LEN {
        return Err(EncodingError::InvalidLength {
            expected: ADDRESS_LEN,
            found: address.len(),
        }
        .into());
    }
    Ok(F::from_le_bytes_mod_order(address))
}

/// Strict little-endian decoding: rejects inputs wider than a field element or `>= q`.
pub fn field_from_le_bytes<F: PrimeField>(bytes: &[u8]) -> Result<F, Error> {
    if bytes.len() > FIELD_BYTES {
        return Err(EncodingError::InvalidLength {
            expected: FIELD_BYTES,
            found: bytes.len(),
        }
        .into());
    }
    canonical(BigUint::from_bytes_le(bytes))
}

pub fn field_to_le_bytes<F: PrimeField>(value: &F) -> Vec<u8> {
    let mut bytes = value.into_bigint().to_bytes_le();
    bytes.resize(FIELD_BYTES, 0);
    bytes
}

pub fn field_from_decimal<F: PrimeField>(s: &str) -> Result<F, Error> {
    let value = BigUint::parse_bytes(s.trim().as_bytes(), 10).ok_or(EncodingError::InvalidDecimal)?;
    canonical(value)
}

pub fn field_to_decimal<F: PrimeField>(value: &F) -> String {
    let value: BigUint = (*value).into();
    value.to_string()
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|_| EncodingError::InvalidHex.into())
}

fn canonical<F: PrimeField>(value: BigUint) -> Result<F, Error> {
    let modulus: BigUint = F::MODULUS.into();
    if value >= modulus {
        return Err(EncodingError::NonCanonical.into());
    }
    Ok(F::from(value))
}
