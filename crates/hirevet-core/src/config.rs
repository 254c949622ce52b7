//! Scoring configuration.
//!
//! The composite weights, missing-signal defaults, and thresholds are
//! product-provided constants that have not been validated against hiring
//! outcome data. They live here as configuration rather than hard-coded
//! truths so they can be tuned without a code change.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or validating a scoring configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Relative weights for the composite interview score.
///
/// Weights are renormalized over the components actually present on a
/// candidate, so they only need to be meaningful relative to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentWeights {
    pub technical: f64,
    pub eq: f64,
    pub behavior: f64,
    pub hiring_probability: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            technical: 0.30,
            eq: 0.25,
            behavior: 0.25,
            hiring_probability: 0.20,
        }
    }
}

/// Interview-score cutoffs for each verdict level.
///
/// This is the global rubric; it is independent of any template's passing
/// threshold, and the two can disagree near a template-specific boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictBands {
    pub strong_hire: u8,
    pub hire: u8,
    pub maybe: u8,
}

impl Default for VerdictBands {
    fn default() -> Self {
        Self {
            strong_hire: 90,
            hire: 80,
            maybe: 70,
        }
    }
}

/// Configuration for the composite score aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    /// Component weights for the interview score
    pub weights: ComponentWeights,

    /// Growth potential when no growth signal is present
    pub default_growth_potential: u8,

    /// Retention score when no retention signal is present
    pub default_retention_score: u8,

    /// Passing threshold when the candidate's template does not set one
    pub default_passing_score: u8,

    /// Verdict cutoffs
    pub verdict_bands: VerdictBands,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            default_growth_potential: 85,
            default_retention_score: 88,
            default_passing_score: 70,
            verdict_bands: VerdictBands::default(),
        }
    }
}

impl ScoringConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        let values = [w.technical, w.eq, w.behavior, w.hiring_probability];

        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid(
                "component weights must be finite and non-negative".to_string(),
            ));
        }
        if values.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Invalid(
                "at least one component weight must be positive".to_string(),
            ));
        }

        let bands = &self.verdict_bands;
        if bands.strong_hire < bands.hire || bands.hire < bands.maybe {
            return Err(ConfigError::Invalid(
                "verdict bands must be ordered strong_hire >= hire >= maybe".to_string(),
            ));
        }

        if self.default_passing_score > 100
            || self.default_growth_potential > 100
            || self.default_retention_score > 100
        {
            return Err(ConfigError::Invalid(
                "scores and thresholds must be within 0-100".to_string(),
            ));
        }

        Ok(())
    }
}
