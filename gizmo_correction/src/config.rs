//! Correction settings
//!
//! Typed, serializable, and validated before use. Loading from and saving to
//! disk is the host's concern; this module only parses and checks values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading a [`CorrectionConfig`]
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse correction config: {0}")]
    Parse(String),

    #[error("Degenerate-geometry epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f64),
}

/// Settings for every correction engine in a registry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// When false, handle edits pass through unmodified
    pub enabled: bool,
    /// Magnitudes below this count as degenerate geometry
    pub degenerate_epsilon: f64,
}

impl CorrectionConfig {
    pub const DEFAULT_EPSILON: f64 = 1e-9;

    /// Config with corrections switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document; missing fields take defaults
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.degenerate_epsilon.is_finite() || self.degenerate_epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.degenerate_epsilon));
        }
        Ok(())
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            degenerate_epsilon: Self::DEFAULT_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CorrectionConfig::default();
        assert!(config.enabled);
        assert_eq!(config.degenerate_epsilon, CorrectionConfig::DEFAULT_EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = CorrectionConfig::from_json(r#"{"enabled": false}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.degenerate_epsilon, CorrectionConfig::DEFAULT_EPSILON);

        let config = CorrectionConfig::from_json("{}").unwrap();
        assert_eq!(config, CorrectionConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let config = CorrectionConfig {
            enabled: false,
            degenerate_epsilon: 1e-6,
        };
        let json = config.to_json().unwrap();
        assert_eq!(CorrectionConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        assert_eq!(
            CorrectionConfig::from_json(r#"{"degenerate_epsilon": 0.0}"#),
            Err(ConfigError::InvalidEpsilon(0.0))
        );
        assert_eq!(
            CorrectionConfig::from_json(r#"{"degenerate_epsilon": -1.0}"#),
            Err(ConfigError::InvalidEpsilon(-1.0))
        );
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = CorrectionConfig::from_json("{enabled: yes");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_disabled() {
        let config = CorrectionConfig::disabled();
        assert!(!config.enabled);
        assert!(config.validate().is_ok());
    }
}
