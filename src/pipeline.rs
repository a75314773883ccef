use ark_bn254::Fr;
use ark_std::rand::{CryptoRng, Rng, RngCore};
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::backend::{Groth16Backend, ProofBackend};
use crate::census;
use crate::circuits::franchise::key_utils::{store_inputs, store_proof};
use crate::circuits::franchise::parser::{CircuitInputs, PublicSignals};
use crate::config::ProverConfig;
use crate::encoding::FieldEncoder;
use crate::hasher::{Hasher, PoseidonHasher};
use crate::identity::{cik, nullifier, ElectionContext, Identity};
use crate::Error;

/// A serialized proof and the JSON array of the public signals it was made for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofOutput {
    pub proof: Vec<u8>,
    pub public_signals: Vec<u8>,
}

/// Builds both trees around `identity` and assembles the full witness object.
#[allow(clippy::too_many_arguments)]
pub fn assemble_inputs<H: Hasher, R: Rng>(
    hasher: &H,
    encoder: &FieldEncoder,
    levels: usize,
    decoys: usize,
    identity: &Identity,
    raw_election_id: &[u8],
    voting_weight: u64,
    factory_weight: u64,
    rng: &mut R,
) -> Result<CircuitInputs, Error> {
    let encoded = identity.encode(encoder)?;
    let election = ElectionContext::new(raw_election_id, voting_weight)?;
    let factory_weight = Fr::from(factory_weight);

    let cik_value = cik(hasher, &encoded)?;
    let cik_proof = census::build(hasher, levels, &identity.address, cik_value, decoys, rng)?;
    let census_proof =
        census::build(hasher, levels, &identity.address, factory_weight, decoys, rng)?;

    let nullifier = nullifier(hasher, &encoded, &election.election_id)?;
    debug!(%nullifier, "nullifier derived");

    let signals = PublicSignals {
        election_id: election.election_id,
        nullifier,
        factory_weight,
        vote_hash: election.vote_hash,
        cik_root: cik_proof.root,
        census_root: census_proof.root,
    };
    Ok(CircuitInputs::from_fields(
        &signals,
        encoded.address,
        encoded.password,
        encoded.signature,
        Fr::from(voting_weight),
        &cik_proof.siblings,
        cik_proof.used_depth,
        &census_proof.siblings,
        census_proof.used_depth,
    ))
}

/// One-shot witness assembly, proving and verification. Holds no state between runs.
pub struct ProofPipeline<H: Hasher, B: ProofBackend> {
    config: ProverConfig,
    encoder: FieldEncoder,
    hasher: H,
    backend: B,
}

impl ProofPipeline<PoseidonHasher, Groth16Backend> {
    pub fn groth16(config: ProverConfig) -> Result<Self, Error> {
        let hasher = PoseidonHasher::bn254();
        let backend = Groth16Backend::new(config.levels, hasher.params().clone());
        Self::new(config, hasher, backend)
    }
}

impl<H: Hasher, B: ProofBackend> ProofPipeline<H, B> {
    pub fn new(config: ProverConfig, hasher: H, backend: B) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: FieldEncoder::bn254(),
            hasher,
            backend,
        })
    }

    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    pub fn setup<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(Vec<u8>, Vec<u8>), Error> {
        let _span = info_span!("setup", levels = self.config.levels).entered();
        self.backend.setup(rng)
    }

    pub fn build_inputs<R: Rng>(
        &self,
        identity: &Identity,
        raw_election_id: &[u8],
        voting_weight: u64,
        factory_weight: u64,
        rng: &mut R,
    ) -> Result<CircuitInputs, Error> {
        let _span = info_span!("build_inputs", levels = self.config.levels).entered();
        assemble_inputs(
            &self.hasher,
            &self.encoder,
            self.config.levels,
            self.config.decoys,
            identity,
            raw_election_id,
            voting_weight,
            factory_weight,
            rng,
        )
    }

    pub fn prove(&self, proving_key: &[u8], inputs: &CircuitInputs) -> Result<ProofOutput, Error> {
        let _span = info_span!("prove", levels = self.config.levels).entered();
        let public_signals = inputs.public_signals()?.to_json()?;
        let proof = self.backend.prove(proving_key, inputs)?;
        info!(size = proof.len(), "proof produced");
        Ok(ProofOutput {
            proof,
            public_signals,
        })
    }

    pub fn verify(
        &self,
        verifying_key: &[u8],
        proof: &[u8],
        public_signals: &[u8],
    ) -> Result<bool, Error> {
        let signals = PublicSignals::from_json(public_signals)?;
        let verified = self.backend.verify(verifying_key, proof, &signals)?;
        info!(verified, "proof checked");
        Ok(verified)
    }

    /// Proves every input independently; the i-th result belongs to `inputs[i]`.
    pub fn prove_batch(
        &self,
        proving_key: &[u8],
        inputs: &[CircuitInputs],
    ) -> Vec<Result<ProofOutput, Error>>
    where
        H: Sync,
        B: Sync,
    {
        inputs
            .par_iter()
            .map(|inputs| self.prove(proving_key, inputs))
            .collect()
    }

    /// Writes the witness, the proof and its public signals under `artifacts_dir`.
    pub fn store_artifacts(
        &self,
        inputs: &CircuitInputs,
        output: &ProofOutput,
    ) -> Result<(), Error> {
        let dir = self.config.artifacts_dir.as_path();
        store_inputs(dir, inputs)?;
        store_proof(dir, &output.proof, &output.public_signals)
    }
}
