//! Core types shared by the voiceprops analysis pipeline

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AnalysisError, Result};

/// Decoded mono waveform handed to every analyzer of one invocation.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Audio samples, nominally in [-1.0, 1.0]
    pub samples: Arc<[f64]>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: impl Into<Arc<[f64]>>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Build a waveform from decoder-native `f32` PCM.
    pub fn from_pcm(samples: &[f32], sample_rate: u32) -> Self {
        let samples: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        Self::new(samples, sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Reject waveforms no analyzer can make sense of. Silence and empty
    /// input are valid and produce degenerate features.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AnalysisError::InvalidWaveform(
                "sample rate must be positive".to_string(),
            ));
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::InvalidWaveform(format!(
                "sample {index} is not finite"
            )));
        }
        Ok(())
    }
}

/// Per-frame fundamental frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    pub index: usize,
    /// Frame start in seconds
    pub time: f64,
    /// Estimated F0 in Hz, 0.0 when unvoiced
    pub frequency: f64,
    /// Normalized autocorrelation at `lag`
    pub harmonic_rate: f64,
    /// Best candidate lag in samples, 0 for silent frames
    pub lag: usize,
    pub voiced: bool,
}

/// Per-frame dominant frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantFrame {
    pub index: usize,
    pub time: f64,
    pub frequency: f64,
    pub magnitude: f64,
}

/// Mean/min/max over a frequency track, NaN when the track is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl TrackSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            mean: sum / values.len() as f64,
            min,
            max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate() {
        let waveform = Waveform::new(vec![0.0; 16], 0);
        assert!(waveform.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_samples() {
        let waveform = Waveform::new(vec![0.0, f64::NAN, 0.0], 8_000);
        let err = waveform.validate().unwrap_err();
        assert!(err.to_string().contains("sample 1"));
    }

    #[test]
    fn empty_waveform_is_valid() {
        let waveform = Waveform::new(Vec::<f64>::new(), 22_050);
        assert!(waveform.validate().is_ok());
        assert_eq!(waveform.duration(), Duration::ZERO);
    }

    #[test]
    fn summary_of_empty_track_is_nan() {
        let summary = TrackSummary::from_values(&[]);
        assert!(summary.is_empty());
        assert!(summary.min.is_nan() && summary.max.is_nan());
    }

    #[test]
    fn summary_orders_min_mean_max() {
        let summary = TrackSummary::from_values(&[120.0, 180.0, 150.0]);
        assert_eq!(summary.min, 120.0);
        assert_eq!(summary.max, 180.0);
        assert_eq!(summary.mean, 150.0);
    }
}
