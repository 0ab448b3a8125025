use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Rate every waveform is brought to before analysis unless disabled.
pub const DEFAULT_ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Tunables for a full feature extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Resample to this rate first; `None` analyzes at the native rate.
    pub analysis_sample_rate: Option<u32>,
    /// Run the three analyzers on scoped worker threads.
    pub parallel: bool,
    pub spectrum: SpectrumConfig,
    pub pitch: PitchConfig,
    pub dominant: DominantConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: Some(DEFAULT_ANALYSIS_SAMPLE_RATE),
            parallel: true,
            spectrum: SpectrumConfig::default(),
            pitch: PitchConfig::default(),
            dominant: DominantConfig::default(),
        }
    }
}

/// Short-time framing used for mean flatness and centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpectrumConfig {
    pub frame_length: usize,
    pub hop_length: usize,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PitchConfig {
    pub frame_length: usize,
    pub hop_length: usize,
    /// Lowest F0 of interest in Hz; sets the maximum autocorrelation lag.
    pub min_frequency: f64,
    /// Highest F0 of interest in Hz; sets the minimum autocorrelation lag.
    pub max_frequency: f64,
    /// Minimum harmonic rate for a frame to count as voiced.
    pub harmonic_threshold: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            frame_length: 1024,
            hop_length: 256,
            min_frequency: 50.0,
            max_frequency: 500.0,
            harmonic_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DominantConfig {
    pub frame_length: usize,
    pub hop_length: usize,
    /// Peak magnitude a frame must exceed to be reported.
    pub min_magnitude: f64,
}

impl Default for DominantConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 1024,
            min_magnitude: 0.1,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_json(&data).with_context(|| format!("Invalid config file {:?}", path))
    }

    /// Parse an inline JSON configuration. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(raw).context("Failed to parse analysis config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        if self.analysis_sample_rate == Some(0) {
            return Err(invalid("analysis_sample_rate must be positive"));
        }
        self.spectrum.validate()?;
        self.pitch.validate()?;
        self.dominant.validate()
    }
}

impl SpectrumConfig {
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        validate_framing("spectrum", self.frame_length, self.hop_length)
    }
}

impl PitchConfig {
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        validate_framing("pitch", self.frame_length, self.hop_length)?;
        if self.min_frequency.is_nan() || self.min_frequency <= 0.0 {
            return Err(invalid("pitch.min_frequency must be positive"));
        }
        if self.max_frequency.is_nan() || self.max_frequency <= self.min_frequency {
            return Err(invalid(
                "pitch.max_frequency must be greater than pitch.min_frequency",
            ));
        }
        if self.harmonic_threshold.is_nan()
            || self.harmonic_threshold <= 0.0
            || self.harmonic_threshold > 1.0
        {
            return Err(invalid("pitch.harmonic_threshold must lie in (0, 1]"));
        }
        Ok(())
    }
}

impl DominantConfig {
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        validate_framing("dominant", self.frame_length, self.hop_length)?;
        if self.min_magnitude.is_nan() || self.min_magnitude < 0.0 {
            return Err(invalid("dominant.min_magnitude must be non-negative"));
        }
        Ok(())
    }
}

fn validate_framing(
    section: &str,
    frame_length: usize,
    hop_length: usize,
) -> std::result::Result<(), AnalysisError> {
    if frame_length == 0 || hop_length == 0 {
        return Err(invalid(format!(
            "{section} frame_length and hop_length must be positive"
        )));
    }
    if hop_length > frame_length {
        return Err(invalid(format!(
            "{section} hop_length ({hop_length}) exceeds frame_length ({frame_length}); frames would leave gaps"
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        assert_eq!(config.analysis_sample_rate, Some(22_050));
        assert!(config.parallel);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{ "parallel": false, "pitch": { "max_frequency": 400.0 } }"#,
        )
        .unwrap();
        assert!(!config.parallel);
        assert_eq!(config.pitch.max_frequency, 400.0);
        assert_eq!(config.pitch.frame_length, 1024);
        assert_eq!(config.dominant, DominantConfig::default());
    }

    #[test]
    fn null_sample_rate_disables_resampling() {
        let config = AnalysisConfig::from_json(r#"{ "analysis_sample_rate": null }"#).unwrap();
        assert_eq!(config.analysis_sample_rate, None);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(AnalysisConfig::from_json(r#"{ "mfcc": 13 }"#).is_err());
    }

    #[test]
    fn rejects_gapped_framing() {
        let mut config = AnalysisConfig::default();
        config.dominant.hop_length = 4096;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gaps"));
    }

    #[test]
    fn rejects_inverted_pitch_range() {
        let mut config = AnalysisConfig::default();
        config.pitch.min_frequency = 600.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut config = AnalysisConfig::default();
        config.pitch.harmonic_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nan_parameters() {
        let mut pitch = PitchConfig::default();
        pitch.min_frequency = f64::NAN;
        assert!(pitch.validate().is_err());

        let mut pitch = PitchConfig::default();
        pitch.harmonic_threshold = f64::NAN;
        assert!(pitch.validate().is_err());

        let dominant = DominantConfig {
            min_magnitude: f64::NAN,
            ..DominantConfig::default()
        };
        assert!(dominant.validate().is_err());
    }

    #[test]
    fn sections_validate_independently() {
        let spectrum = SpectrumConfig {
            frame_length: 0,
            ..SpectrumConfig::default()
        };
        assert!(spectrum.validate().is_err());
        assert!(PitchConfig::default().validate().is_ok());
        assert!(DominantConfig::default().validate().is_ok());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(&path, r#"{ "dominant": { "min_magnitude": 0.5 } }"#).unwrap();
        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.dominant.min_magnitude, 0.5);
    }
}
