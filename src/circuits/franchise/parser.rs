//! JSON boundary of the circuit: the witness object handed to a prover and the
//! public signal array handed to a verifier. Every field element travels as a
//! canonical decimal string.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use serde::{Deserialize, Serialize};

use crate::census::builder::infer_used_depth;
use crate::circuits::franchise::franchise_circuit::{
    FranchiseCircuit, FranchiseInstance, FranchiseWitness,
};
use crate::encoding::{field_from_decimal, field_to_decimal};
use crate::{EncodingError, Error};

pub const PUBLIC_SIGNALS_LEN: usize = 8;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CircuitInputs {
    pub election_id: [String; 2],
    pub nullifier: String,
    #[serde(alias = "factoryWeight")]
    pub available_weight: String,
    pub vote_hash: [String; 2],
    pub cik_root: String,
    pub census_root: String,
    pub address: String,
    pub password: String,
    pub signature: String,
    #[serde(alias = "votingWeight")]
    pub vote_weight: String,
    pub cik_siblings: Vec<String>,
    pub census_siblings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cik_used_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub census_used_depth: Option<usize>,
}

fn parse_siblings(values: &[String], levels: usize) -> Result<Vec<Fr>, Error> {
    if values.len() != levels {
        return Err(EncodingError::SiblingCount {
            expected: levels,
            found: values.len(),
        }
        .into());
    }
    values.iter().map(|s| field_from_decimal(s)).collect()
}

fn decimals(values: &[Fr]) -> Vec<String> {
    values.iter().map(field_to_decimal).collect()
}

impl CircuitInputs {
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        signals: &PublicSignals,
        address: Fr,
        password: Fr,
        signature: Fr,
        vote_weight: Fr,
        cik_siblings: &[Fr],
        cik_used_depth: usize,
        census_siblings: &[Fr],
        census_used_depth: usize,
    ) -> Self {
        Self {
            election_id: signals.election_id.map(|e| field_to_decimal(&e)),
            nullifier: field_to_decimal(&signals.nullifier),
            available_weight: field_to_decimal(&signals.factory_weight),
            vote_hash: signals.vote_hash.map(|v| field_to_decimal(&v)),
            cik_root: field_to_decimal(&signals.cik_root),
            census_root: field_to_decimal(&signals.census_root),
            address: field_to_decimal(&address),
            password: field_to_decimal(&password),
            signature: field_to_decimal(&signature),
            vote_weight: field_to_decimal(&vote_weight),
            cik_siblings: decimals(cik_siblings),
            census_siblings: decimals(census_siblings),
            cik_used_depth: Some(cik_used_depth),
            census_used_depth: Some(census_used_depth),
        }
    }

    pub fn public_signals(&self) -> Result<PublicSignals, Error> {
        Ok(PublicSignals {
            election_id: [
                field_from_decimal(&self.election_id[0])?,
                field_from_decimal(&self.election_id[1])?,
            ],
            nullifier: field_from_decimal(&self.nullifier)?,
            factory_weight: field_from_decimal(&self.available_weight)?,
            vote_hash: [
                field_from_decimal(&self.vote_hash[0])?,
                field_from_decimal(&self.vote_hash[1])?,
            ],
            cik_root: field_from_decimal(&self.cik_root)?,
            census_root: field_from_decimal(&self.census_root)?,
        })
    }

    /// Parses the witness into a circuit of depth `levels`. Sibling arrays must have
    /// exactly `levels` entries; a missing used depth is inferred from the last
    /// non-zero sibling.
    pub fn to_circuit(
        &self,
        levels: usize,
        hash_params: PoseidonConfig<Fr>,
    ) -> Result<FranchiseCircuit<Fr>, Error> {
        let cik_siblings = parse_siblings(&self.cik_siblings, levels)?;
        let census_siblings = parse_siblings(&self.census_siblings, levels)?;
        let cik_used_depth = self
            .cik_used_depth
            .unwrap_or_else(|| infer_used_depth(&cik_siblings));
        let census_used_depth = self
            .census_used_depth
            .unwrap_or_else(|| infer_used_depth(&census_siblings));

        let instance = FranchiseInstance::from(self.public_signals()?);
        let witness = FranchiseWitness {
            address: Some(field_from_decimal(&self.address)?),
            password: Some(field_from_decimal(&self.password)?),
            signature: Some(field_from_decimal(&self.signature)?),
            voting_weight: Some(field_from_decimal(&self.vote_weight)?),
            cik_siblings: Some(cik_siblings),
            cik_used_depth: Some(cik_used_depth),
            census_siblings: Some(census_siblings),
            census_used_depth: Some(census_used_depth),
        };
        Ok(FranchiseCircuit::new(levels, hash_params, instance, witness))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The eight public inputs, in the order the verifying key expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicSignals {
    pub election_id: [Fr; 2],
    pub nullifier: Fr,
    pub factory_weight: Fr,
    pub vote_hash: [Fr; 2],
    pub cik_root: Fr,
    pub census_root: Fr,
}

impl PublicSignals {
    pub fn to_vec(&self) -> Vec<Fr> {
        vec![
            self.election_id[0],
            self.election_id[1],
            self.nullifier,
            self.factory_weight,
            self.vote_hash[0],
            self.vote_hash[1],
            self.cik_root,
            self.census_root,
        ]
    }

    pub fn from_slice(values: &[Fr]) -> Result<Self, Error> {
        if values.len() != PUBLIC_SIGNALS_LEN {
            return Err(EncodingError::InvalidLength {
                expected: PUBLIC_SIGNALS_LEN,
                found: values.len(),
            }
            .into());
        }
        Ok(Self {
            election_id: [values[0], values[1]],
            nullifier: values[2],
            factory_weight: values[3],
            vote_hash: [values[4], values[5]],
            cik_root: values[6],
            census_root: values[7],
        })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(&decimals(&self.to_vec()))?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let strings: Vec<String> = serde_json::from_slice(bytes)?;
        let values = strings
            .iter()
            .map(|s| field_from_decimal(s))
            .collect::<Result<Vec<Fr>, Error>>()?;
        Self::from_slice(&values)
    }
}

impl From<PublicSignals> for FranchiseInstance<Fr> {
    fn from(signals: PublicSignals) -> Self {
        Self {
            election_id: Some(signals.election_id),
            nullifier: Some(signals.nullifier),
            factory_weight: Some(signals.factory_weight),
            vote_hash: Some(signals.vote_hash),
            cik_root: Some(signals.cik_root),
            census_root: Some(signals.census_root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::franchise::poseidon_params::bn254_poseidon_params;

    fn signals() -> PublicSignals {
        PublicSignals {
            election_id: [Fr::from(1u64), Fr::from(2u64)],
            nullifier: Fr::from(3u64),
            factory_weight: Fr::from(10u64),
            vote_hash: [Fr::from(5u64), Fr::from(6u64)],
            cik_root: Fr::from(7u64),
            census_root: Fr::from(8u64),
        }
    }

    fn inputs(levels: usize) -> CircuitInputs {
        let mut siblings = vec![Fr::from(0u64); levels];
        siblings[0] = Fr::from(9u64);
        siblings[1] = Fr::from(4u64);
        let mut inputs = CircuitInputs::from_fields(
            &signals(),
            Fr::from(11u64),
            Fr::from(12u64),
            Fr::from(13u64),
            Fr::from(5u64),
            &siblings,
            2,
            &siblings,
            2,
        );
        inputs.cik_used_depth = None;
        inputs.census_used_depth = None;
        inputs
    }

    #[test]
    fn test_public_signals_json_order() {
        let json = signals().to_json().unwrap();
        assert_eq!(
            String::from_utf8(json.clone()).unwrap(),
            r#"["1","2","3","10","5","6","7","8"]"#
        );
        assert_eq!(PublicSignals::from_json(&json).unwrap(), signals());
    }

    #[test]
    fn test_public_signals_length_is_checked() {
        assert!(PublicSignals::from_json(br#"["1","2","3"]"#).is_err());
    }

    #[test]
    fn test_inputs_accept_alias_names() {
        let mut value = serde_json::to_value(inputs(4)).unwrap();
        let object = value.as_object_mut().unwrap();
        let weight = object.remove("availableWeight").unwrap();
        object.insert("factoryWeight".to_string(), weight);
        let vote = object.remove("voteWeight").unwrap();
        object.insert("votingWeight".to_string(), vote);

        let parsed: CircuitInputs = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, inputs(4));
    }

    #[test]
    fn test_used_depth_is_inferred() {
        let circuit = inputs(4).to_circuit(4, bn254_poseidon_params()).unwrap();
        assert_eq!(circuit.witness.cik_used_depth, Some(2));
        assert_eq!(circuit.witness.census_used_depth, Some(2));
        assert_eq!(circuit.public_signals().unwrap(), signals());
    }

    #[test]
    fn test_sibling_count_must_match_levels() {
        assert!(matches!(
            inputs(4).to_circuit(5, bn254_poseidon_params()),
            Err(Error::Encoding(EncodingError::SiblingCount { expected: 5, found: 4 }))
        ));
    }

    #[test]
    fn test_non_canonical_value_is_rejected() {
        let mut bad = inputs(4);
        bad.nullifier =
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
                .to_string();
        assert!(bad.public_signals().is_err());
    }
}
