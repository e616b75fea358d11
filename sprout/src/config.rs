//! Configuration for driving generators outside of an explicit seed.

use thiserror::Error;
use tracing::debug;

use crate::seed::StdSeed;

/// Environment variable overriding [`GenConfig::max_size`]
pub const ENV_MAX_SIZE: &str = "SPROUT_MAX_SIZE";
/// Environment variable fixing [`GenConfig::seed`]
pub const ENV_SEED: &str = "SPROUT_SEED";
/// Environment variable overriding [`GenConfig::sample_count`]
pub const ENV_SAMPLE_COUNT: &str = "SPROUT_SAMPLE_COUNT";

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid number of samples (must be > 0)
    #[error("Invalid sample count: {0} (must be > 0)")]
    InvalidSampleCount(usize),

    /// An environment variable could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: &'static str, value: String },
}

/// Parameters for top-level generation and sampling
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenConfig {
    /// Upper bound of the size sampled per generation
    pub max_size: usize,
    /// Fixed seed; `None` draws one from entropy on every use
    pub seed: Option<u64>,
    /// Number of values produced by [`sample`](crate::combinators::sample)
    pub sample_count: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            seed: None,
            sample_count: 11,
        }
    }
}

impl GenConfig {
    /// Create a new configuration with validation
    pub fn new(
        max_size: usize,
        seed: Option<u64>,
        sample_count: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            max_size,
            seed,
            sample_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::InvalidSampleCount(self.sample_count));
        }
        Ok(())
    }

    /// Set the upper bound of sampled sizes
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Fix the seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of values drawn by `sample`
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Defaults overridden by `SPROUT_MAX_SIZE`, `SPROUT_SEED` and
    /// `SPROUT_SAMPLE_COUNT` where set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(max_size) = parse_var(&lookup, ENV_MAX_SIZE)? {
            config.max_size = max_size;
        }
        if let Some(seed) = parse_var(&lookup, ENV_SEED)? {
            config.seed = Some(seed);
        }
        if let Some(sample_count) = parse_var(&lookup, ENV_SAMPLE_COUNT)? {
            config.sample_count = sample_count;
        }
        config.validate()?;
        debug!(
            max_size = config.max_size,
            seed = ?config.seed,
            sample_count = config.sample_count,
            "loaded generation config"
        );
        Ok(config)
    }

    /// The configured seed, or a fresh one from entropy
    pub fn seed(&self) -> StdSeed {
        match self.seed {
            Some(key) => StdSeed::new(key),
            None => StdSeed::from_entropy(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.seed, None);
        assert_eq!(config.sample_count, 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(GenConfig::new(50, Some(1), 5).is_ok());
        assert!(matches!(
            GenConfig::new(50, None, 0),
            Err(ConfigError::InvalidSampleCount(0))
        ));
        // A zero max size only pins every generation to size 0
        assert!(GenConfig::new(0, None, 1).is_ok());
    }

    #[test]
    fn test_builders() {
        let config = GenConfig::default()
            .with_max_size(30)
            .with_seed(9)
            .with_sample_count(3);
        assert_eq!(config, GenConfig::new(30, Some(9), 3).unwrap());
    }

    #[test]
    fn test_seed_is_fixed_when_configured() {
        let config = GenConfig::default().with_seed(1234);
        assert_eq!(config.seed(), StdSeed::new(1234));
        assert_eq!(config.seed(), config.seed());
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config = GenConfig::from_lookup(lookup_from(&[
            (ENV_MAX_SIZE, "25"),
            (ENV_SEED, " 77 "),
        ]))
        .unwrap();
        assert_eq!(config.max_size, 25);
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.sample_count, 11);

        let untouched = GenConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(untouched, GenConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = GenConfig::from_lookup(lookup_from(&[(ENV_SEED, "abc")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnvVar {
                name: ENV_SEED,
                value: "abc".to_string()
            }
        );

        let err = GenConfig::from_lookup(lookup_from(&[(ENV_SAMPLE_COUNT, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidSampleCount(0));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::InvalidSampleCount(0).to_string(),
            "Invalid sample count: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::InvalidEnvVar {
                name: ENV_MAX_SIZE,
                value: "x".into()
            }
            .to_string(),
            "Invalid value for SPROUT_MAX_SIZE: \"x\""
        );
    }
}
