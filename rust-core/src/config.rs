//! Processing configuration
//!
//! Replaces process-wide constants with an explicit value threaded through
//! every call, so bursts with different parameters can run side by side.

use crate::error::{PsdError, Result};
use crate::spectrum::segments::WindowSpec;
use serde::Deserialize;
use std::path::Path;

/// Sampling rate of the burst waveform receiver (Hz)
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 35000.0;

/// Box length of the on-board fixed-window algorithm (~0.468 s at 35 kHz)
pub const FIXED_BOX_LEN: usize = 16384;

/// Physical duration covered by one on-board fixed window (s)
pub const REFERENCE_WINDOW_SECS: f64 = 0.468;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Sample rate in Hz (samples per second, not the sampling interval)
    pub sample_rate_hz: f64,

    /// Box length for fixed (non-overlapping) windows
    pub fixed_box: usize,

    /// Box length for sliding windows
    pub sliding_box: usize,

    /// Stride between consecutive sliding windows
    pub slider: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            fixed_box: FIXED_BOX_LEN,
            sliding_box: 1024,
            slider: 512,
        }
    }
}

impl ProcessingConfig {
    /// Parse and validate a TOML document
    ///
    /// Missing keys fall back to [`ProcessingConfig::default`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PsdError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(PsdError::InvalidConfig(format!(
                "sample rate must be positive and finite (got {})",
                self.sample_rate_hz
            )));
        }
        self.fixed_spec().validate()?;
        self.sliding_spec().validate()
    }

    /// Window geometry for fixed mode (stride == box length)
    pub fn fixed_spec(&self) -> WindowSpec {
        WindowSpec::non_overlapping(self.fixed_box)
    }

    /// Window geometry for sliding mode
    pub fn sliding_spec(&self) -> WindowSpec {
        WindowSpec::new(self.sliding_box, self.slider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ProcessingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fixed_spec().stride, config.fixed_box);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ProcessingConfig::from_toml_str("slider = 256\n").unwrap();
        assert_eq!(config.slider, 256);
        assert_eq!(config.sliding_box, 1024);
        assert_eq!(config.fixed_box, FIXED_BOX_LEN);
    }

    #[test]
    fn test_rejects_slider_longer_than_box() {
        let err = ProcessingConfig::from_toml_str("sliding_box = 256\nslider = 512\n").unwrap_err();
        assert!(matches!(err, PsdError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        let config = ProcessingConfig {
            sample_rate_hz: 0.0,
            ..ProcessingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = ProcessingConfig::from_toml_str("slider = \"wide\"").unwrap_err();
        assert!(matches!(err, PsdError::ParseConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ProcessingConfig::load("/nonexistent/burst-psd.toml").unwrap_err();
        assert!(matches!(err, PsdError::ReadConfig { .. }));
    }
}
