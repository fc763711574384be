//! Engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FxError, FxResult, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};

/// Which processing backend the dispatcher may pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Vectorized when the CPU supports it, scalar otherwise
    Auto,
    /// Always the portable scalar kernels
    Scalar,
    /// Vectorized when available (falls back to scalar if not)
    Vectorized,
}

impl Default for BackendPreference {
    fn default() -> Self {
        Self::Auto
    }
}

/// Automatic gain controller (limiter) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgcConfig {
    /// Enabled at initialization
    pub enabled: bool,

    /// Gain slope while the output clips (dB/s, negative)
    pub reduction_db_per_second: f64,

    /// Gain slope while recovering (dB/s, positive)
    pub recovery_db_per_second: f64,

    /// Quiet time required after the last clipping frame before recovery starts
    pub hold_off_ms: u32,
}

impl Default for AgcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // Brick-wall limiting is harsh and dropping the gain abruptly clicks
            reduction_db_per_second: -40.0,
            recovery_db_per_second: 0.5,
            hold_off_ms: 1000,
        }
    }
}

/// Effects engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Backend selection policy
    pub backend: BackendPreference,

    /// Gain limiter
    pub agc: AgcConfig,

    /// Bass boost gain at full strength, in dB
    pub bass_boost_max_db: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            backend: BackendPreference::Auto,
            agc: AgcConfig::default(),
            bass_boost_max_db: 15.0,
        }
    }
}

impl EffectsConfig {
    /// Parse from a JSON document and validate
    pub fn from_json_str(json: &str) -> FxResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate
    pub fn load(path: impl AsRef<Path>) -> FxResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded effects config from {}", path.display());
        Ok(config)
    }

    /// Set sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set backend preference
    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Set AGC hold-off
    pub fn with_hold_off_ms(mut self, hold_off_ms: u32) -> Self {
        self.agc.hold_off_ms = hold_off_ms;
        self
    }

    pub fn validate(&self) -> FxResult<()> {
        validate_sample_rate(self.sample_rate)?;

        let agc = &self.agc;
        if !(agc.reduction_db_per_second.is_finite() && agc.reduction_db_per_second < 0.0) {
            return Err(FxError::InvalidConfig(format!(
                "agc.reduction_db_per_second must be negative, got {}",
                agc.reduction_db_per_second
            )));
        }
        if !(agc.recovery_db_per_second.is_finite() && agc.recovery_db_per_second > 0.0) {
            return Err(FxError::InvalidConfig(format!(
                "agc.recovery_db_per_second must be positive, got {}",
                agc.recovery_db_per_second
            )));
        }
        if !(self.bass_boost_max_db.is_finite() && (0.0..=24.0).contains(&self.bass_boost_max_db)) {
            return Err(FxError::InvalidConfig(format!(
                "bass_boost_max_db must be within 0..=24, got {}",
                self.bass_boost_max_db
            )));
        }
        Ok(())
    }
}

/// Reject sample rates the engine cannot run at
pub fn validate_sample_rate(sample_rate: u32) -> FxResult<()> {
    if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(())
    } else {
        Err(FxError::InvalidSampleRate(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EffectsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.backend, BackendPreference::Auto);
        assert!(config.agc.enabled);
        assert_eq!(config.agc.reduction_db_per_second, -40.0);
        assert_eq!(config.agc.recovery_db_per_second, 0.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EffectsConfig::from_json_str(r#"{ "sample_rate": 48000, "backend": "scalar" }"#)
                .unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.backend, BackendPreference::Scalar);
        assert_eq!(config.agc.hold_off_ms, 1000);
    }

    #[test]
    fn test_nested_agc_json() {
        let config = EffectsConfig::from_json_str(
            r#"{ "agc": { "enabled": false, "hold_off_ms": 20 } }"#,
        )
        .unwrap();
        assert!(!config.agc.enabled);
        assert_eq!(config.agc.hold_off_ms, 20);
        assert_eq!(config.agc.reduction_db_per_second, -40.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EffectsConfig::from_json_str(r#"{ "sample_rate": 0 }"#),
            Err(FxError::InvalidSampleRate(0))
        ));
        assert!(matches!(
            EffectsConfig::from_json_str(r#"{ "agc": { "recovery_db_per_second": -1.0 } }"#),
            Err(FxError::InvalidConfig(_))
        ));
        assert!(matches!(
            EffectsConfig::from_json_str("{ not json"),
            Err(FxError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sample_rate": 22050, "bass_boost_max_db": 9.0 }}"#).unwrap();

        let config = EffectsConfig::load(file.path()).unwrap();
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.bass_boost_max_db, 9.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EffectsConfig::load("/nonexistent/fx.json").unwrap_err();
        assert!(matches!(err, FxError::Io(_)));
    }
}
