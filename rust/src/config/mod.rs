use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::FaultPolicy;

pub const DEFAULT_BUFFER_SIZE: usize = 1;
pub const DEFAULT_NUM_TREES: usize = 10_000;
pub const DEFAULT_ERROR_RATE: usize = 10;
pub const DEFAULT_RECORDS_PATH: &str = "cds.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("buffer_size must be at least 1")]
    ZeroBufferSize,
    #[error("num_trees must be at least 1")]
    ZeroTrees,
    #[error("error_rate must be at least 1")]
    ZeroErrorRate,
    #[error("unable to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Run parameters. Missing fields in a JSON config take their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Slots in the producer/consumer buffer.
    pub buffer_size: usize,
    /// Work items per phase; also the termination count for both counters.
    pub num_trees: usize,
    /// Fault knob, see [`FaultPolicy`].
    pub error_rate: usize,
    pub records_path: PathBuf,
    /// Fixed seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
            num_trees: DEFAULT_NUM_TREES,
            error_rate: DEFAULT_ERROR_RATE,
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            seed: None,
        }
    }
}

impl HarnessConfig {
    pub fn from_json(text: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_json(&text, &origin)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        if self.num_trees == 0 {
            return Err(ConfigError::ZeroTrees);
        }
        if self.error_rate == 0 {
            return Err(ConfigError::ZeroErrorRate);
        }
        Ok(())
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        FaultPolicy::new(self.error_rate, self.num_trees)
    }
}
