use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use lazy_static::lazy_static;
use tracing::info;

use super::parser::{CircuitInputs, PublicSignals};
use crate::Error;

lazy_static! {
    pub static ref PK_FILE: String = "franchise.pk.dat".to_string();
    pub static ref VK_FILE: String = "franchise.vk.dat".to_string();
    pub static ref INPUTS_FILE: String = "inputs_example.json".to_string();
    pub static ref PRF_FILE: String = "proof.dat".to_string();
    pub static ref SIGNALS_FILE: String = "signals.json".to_string();
}

pub fn to_compressed_bytes<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

pub fn pk_from_bytes(bytes: &[u8]) -> Result<ProvingKey<Bn254>, Error> {
    Ok(ProvingKey::<Bn254>::deserialize_compressed(bytes)?)
}

pub fn vk_from_bytes(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, Error> {
    Ok(VerifyingKey::<Bn254>::deserialize_compressed(bytes)?)
}

pub fn proof_from_bytes(bytes: &[u8]) -> Result<Proof<Bn254>, Error> {
    Ok(Proof::<Bn254>::deserialize_compressed(bytes)?)
}

fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), Error> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    info!(path = %path.display(), size = bytes.len(), "artifact written");
    Ok(())
}

pub fn store_pk_vk(
    dir: &Path,
    pk: &ProvingKey<Bn254>,
    vk: &VerifyingKey<Bn254>,
) -> Result<(), Error> {
    write_artifact(dir, PK_FILE.as_str(), &to_compressed_bytes(pk)?)?;
    write_artifact(dir, VK_FILE.as_str(), &to_compressed_bytes(vk)?)?;
    Ok(())
}

pub fn load_pk(dir: &Path) -> Result<ProvingKey<Bn254>, Error> {
    read_proving_key(&dir.join(PK_FILE.as_str()))
}

pub fn load_vk(dir: &Path) -> Result<VerifyingKey<Bn254>, Error> {
    read_verifying_key(&dir.join(VK_FILE.as_str()))
}

pub fn read_proving_key(file_path: &Path) -> Result<ProvingKey<Bn254>, Error> {
    let file = File::open(file_path)?;
    let mut reader = BufReader::new(file);
    let pk = ProvingKey::<Bn254>::deserialize_compressed(&mut reader)?;
    Ok(pk)
}

pub fn read_verifying_key(file_path: &Path) -> Result<VerifyingKey<Bn254>, Error> {
    let file = File::open(file_path)?;
    let mut reader = BufReader::new(file);
    let vk = VerifyingKey::<Bn254>::deserialize_compressed(&mut reader)?;
    Ok(vk)
}

pub fn store_inputs(dir: &Path, inputs: &CircuitInputs) -> Result<(), Error> {
    write_artifact(dir, INPUTS_FILE.as_str(), &inputs.to_json()?)
}

pub fn load_inputs(dir: &Path) -> Result<CircuitInputs, Error> {
    CircuitInputs::from_json(&fs::read(dir.join(INPUTS_FILE.as_str()))?)
}

/// Writes the serialized proof and its public signal array side by side.
pub fn store_proof(dir: &Path, proof: &[u8], public_signals: &[u8]) -> Result<(), Error> {
    write_artifact(dir, PRF_FILE.as_str(), proof)?;
    write_artifact(dir, SIGNALS_FILE.as_str(), public_signals)
}

pub fn load_proof(dir: &Path) -> Result<(Vec<u8>, PublicSignals), Error> {
    let proof = fs::read(dir.join(PRF_FILE.as_str()))?;
    let signals = PublicSignals::from_json(&fs::read(dir.join(SIGNALS_FILE.as_str()))?)?;
    Ok((proof, signals))
}
