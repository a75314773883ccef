//! Off-circuit membership trees: the CIK registry (`address -> cik`) and the
//! census (`address -> eligible weight`). Both are built fresh for every proof.

pub mod builder;
pub mod tree;

pub use builder::{build, InclusionProof};
pub use tree::{MembershipStore, SparseMerkleTree};
