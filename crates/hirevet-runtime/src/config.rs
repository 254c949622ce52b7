//! Runtime configuration.
//!
//! Everything operational lives here: provider call settings, the sweep
//! cadence, the inter-candidate throttle, and the scoring constants
//! forwarded to `hirevet-core`. Durations serialize as plain integers
//! (seconds or milliseconds) to keep config files boring.

use hirevet_core::{ConfigError, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::CompletionConfig;

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Operational configuration for the evaluation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    /// Per-call provider timeout, in seconds
    #[serde(with = "duration_secs")]
    pub provider_timeout: Duration,

    /// Maximum tokens per provider completion
    pub max_tokens: u32,

    /// Provider sampling temperature
    pub temperature: f32,

    /// Time between scheduled batch sweeps, in seconds
    #[serde(with = "duration_secs")]
    pub sweep_interval: Duration,

    /// Throttle between candidates within a sweep, in milliseconds
    #[serde(with = "duration_millis")]
    pub inter_candidate_delay: Duration,

    /// Directory for generated decision letters
    pub letters_dir: PathBuf,

    /// Scoring constants forwarded to the aggregator
    pub scoring: ScoringConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(30),
            max_tokens: 2000,
            temperature: 0.3,
            sweep_interval: Duration::from_secs(300),
            inter_candidate_delay: Duration::from_millis(1000),
            letters_dir: PathBuf::from("letters"),
            scoring: ScoringConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Provider call settings derived from this configuration.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.provider_timeout,
        }
    }
}
