use ark_relations::r1cs::SynthesisError;
use ark_serialize::SerializationError;
use thiserror::Error;

/// Crate-wide error type. Every variant is terminal: nothing in this crate retries.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input rejected before witness assembly.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Duplicate key, missing key or an over-deep tree.
    #[error("tree invariant violation: {0}")]
    Tree(#[from] TreeError),

    /// The witness does not satisfy the named constraint; no proof is produced.
    #[error("unsatisfiable witness: {0}")]
    Unsatisfiable(Constraint),

    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("artifact (de)serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("hash oracle failed: {0}")]
    Hash(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("value is not a canonical field element")]
    NonCanonical,

    #[error("invalid decimal string")]
    InvalidDecimal,

    #[error("invalid hex string")]
    InvalidHex,

    #[error("encoder modulus does not match the target field")]
    ModulusMismatch,

    #[error("expected {expected} siblings, found {found}")]
    SiblingCount { expected: usize, found: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("key already present in the tree")]
    DuplicateKey,

    #[error("key not present in the tree")]
    KeyNotFound,

    #[error("leaf would exceed the maximum of {0} levels")]
    MaxLevels(usize),

    #[error("key longer than {0} bytes")]
    KeyTooLong(usize),
}

/// Names the constraint a witness failed, without carrying any witness value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    #[error("voting weight exceeds the eligible weight")]
    WeightBound,

    #[error("weight outside the comparable range")]
    WeightRange,

    #[error("vote hash limb is zero")]
    VoteHashZero,

    #[error("identity commitment is not a member of the CIK tree")]
    CikMembership,

    #[error("eligible weight is not a member of the census tree")]
    CensusMembership,

    #[error("padding siblings beyond the used depth are not zero")]
    SiblingPadding,

    #[error("used depth exceeds the circuit depth")]
    UsedDepth,

    #[error("nullifier does not match the derived one")]
    Nullifier,

    #[error("constraint system is not satisfied")]
    ConstraintSystem,
}
