use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::Error;

/// Number of sibling slots the circuit carries per tree.
pub const DEFAULT_LEVELS: usize = 160;
/// Address width in bits; path bits beyond it would not come from the key.
pub const MAX_LEVELS: usize = 160;
pub const DEFAULT_DECOYS: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProverConfig {
    pub levels: usize,
    pub decoys: usize,
    pub artifacts_dir: PathBuf,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            decoys: DEFAULT_DECOYS,
            artifacts_dir: PathBuf::from("./artifacts"),
        }
    }
}

impl ProverConfig {
    pub fn with_levels(levels: usize) -> Self {
        Self {
            levels,
            ..Self::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = fs::read_to_string(path)?;
        let config: ProverConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.levels == 0 || self.levels > MAX_LEVELS {
            return Err(Error::Config(format!(
                "levels must be between 1 and {}, got {}",
                MAX_LEVELS, self.levels
            )));
        }
        Ok(())
    }
}

/// Installs a fmt subscriber honouring `RUST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a subscriber may already be installed by the embedding application or another test
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
