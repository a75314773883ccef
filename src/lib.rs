//! Anonymous franchise proofs: a Groth16 circuit over BN254 proving that a voter is
//! registered in an identity-key (CIK) tree and in a weighted census tree, that the
//! weight spent does not exceed the eligible weight, and that a per-election
//! nullifier was derived from the voter's secrets.
//!
//! The witness side ([`census`], [`encoding`], [`identity`]) builds exactly the
//! values the circuit in [`circuits::franchise`] re-derives.

pub mod backend;
pub mod census;
pub mod circuits;
pub mod config;
pub mod encoding;
mod error;
pub mod hasher;
pub mod identity;
pub mod pipeline;

pub use error::{Constraint, EncodingError, Error, TreeError};
