pub mod dominant;
pub mod framing;
pub mod modulation;
pub mod pitch;
mod short_time;
pub mod spectrum;
mod statistics;

use std::thread;

use tracing::{debug, info};

use crate::audio::resample;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::record::{FeatureRecord, RawFeatures};
use crate::types::Waveform;

use dominant::{DominantFrequencyTracker, DominantTrack};
use modulation::ModulationIndex;
use pitch::{PitchTrack, PitchTracker};
use spectrum::{SpectralStatistics, SpectrumAnalyzer};

/// Everything the analyzers produced for one waveform, before aggregation.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub spectral: SpectralStatistics,
    pub pitch: PitchTrack,
    pub dominant: DominantTrack,
    pub modulation: ModulationIndex,
}

impl AnalysisReport {
    pub fn raw_features(&self) -> RawFeatures {
        let spectral = &self.spectral;
        let fundamental = self.pitch.summary();
        let dominant = self.dominant.summary();
        RawFeatures {
            mean_frequency: spectral.mean_frequency,
            standard_deviation: spectral.standard_deviation,
            median_frequency: spectral.median_frequency,
            q25: spectral.q25,
            q75: spectral.q75,
            iqr: spectral.iqr,
            skewness: spectral.skewness,
            kurtosis: spectral.kurtosis,
            entropy: spectral.entropy,
            mean_flatness: spectral.mean_flatness,
            mode_frequency: spectral.mode_frequency,
            mean_centroid: spectral.mean_centroid,
            peak_frequency: spectral.peak_frequency,
            mean_fundamental: fundamental.mean,
            min_fundamental: fundamental.min,
            max_fundamental: fundamental.max,
            mean_dominant: dominant.mean,
            min_dominant: dominant.min,
            max_dominant: dominant.max,
            dominant_range: self.modulation.dfrange,
            modulation_index: self.modulation.index,
        }
    }
}

/// Composes the spectrum, pitch and dominant-frequency analyzers into one
/// feature record per waveform.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    spectrum: SpectrumAnalyzer,
    pitch: PitchTracker,
    dominant: DominantFrequencyTracker,
    analysis_sample_rate: Option<u32>,
    parallel: bool,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self::new(
            SpectrumAnalyzer::default(),
            PitchTracker::default(),
            DominantFrequencyTracker::default(),
        )
        .with_analysis_sample_rate(config.analysis_sample_rate)
        .with_parallel(config.parallel)
    }
}

impl FeatureExtractor {
    /// Build from pre-constructed analyzers, each already validated by its
    /// own constructor. Waveforms are analyzed at their native rate on the
    /// calling thread.
    pub fn new(
        spectrum: SpectrumAnalyzer,
        pitch: PitchTracker,
        dominant: DominantFrequencyTracker,
    ) -> Self {
        Self {
            spectrum,
            pitch,
            dominant,
            analysis_sample_rate: None,
            parallel: false,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            SpectrumAnalyzer::new(config.spectrum)?,
            PitchTracker::new(config.pitch)?,
            DominantFrequencyTracker::new(config.dominant)?,
        )
        .with_analysis_sample_rate(config.analysis_sample_rate)
        .with_parallel(config.parallel))
    }

    pub fn with_analysis_sample_rate(mut self, rate: Option<u32>) -> Self {
        self.analysis_sample_rate = rate;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the full pipeline and return the unit-converted record.
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureRecord> {
        let report = self.analyze(waveform)?;
        FeatureRecord::from_raw(&report.raw_features())
    }

    /// Run every analyzer and keep their intermediate outputs.
    pub fn analyze(&self, waveform: &Waveform) -> Result<AnalysisReport> {
        waveform.validate()?;
        let waveform = match self.analysis_sample_rate {
            Some(rate) if rate != waveform.sample_rate => {
                debug!(from = waveform.sample_rate, to = rate, "resampling waveform");
                resample::to_rate(waveform, rate)?
            }
            _ => waveform.clone(),
        };
        info!(
            samples = waveform.len(),
            sample_rate = waveform.sample_rate,
            parallel = self.parallel,
            "extracting features"
        );

        let (spectral, pitch, dominant) = if self.parallel {
            self.run_parallel(&waveform)?
        } else {
            (
                self.spectrum.analyze(&waveform)?,
                self.pitch.track(&waveform)?,
                self.dominant.track(&waveform)?,
            )
        };

        let modulation = ModulationIndex::compute(&dominant.frequencies());
        Ok(AnalysisReport {
            spectral,
            pitch,
            dominant,
            modulation,
        })
    }

    fn run_parallel(
        &self,
        waveform: &Waveform,
    ) -> Result<(SpectralStatistics, PitchTrack, DominantTrack)> {
        thread::scope(|scope| -> Result<(SpectralStatistics, PitchTrack, DominantTrack)> {
            let spectral = scope.spawn(|| self.spectrum.analyze(waveform));
            let pitch = scope.spawn(|| self.pitch.track(waveform));
            let dominant = scope.spawn(|| self.dominant.track(waveform));

            let spectral = spectral
                .join()
                .map_err(|_| AnalysisError::WorkerPanicked("spectrum"));
            let pitch = pitch
                .join()
                .map_err(|_| AnalysisError::WorkerPanicked("pitch"));
            let dominant = dominant
                .join()
                .map_err(|_| AnalysisError::WorkerPanicked("dominant frequency"));
            Ok((spectral??, pitch??, dominant??))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DominantConfig, PitchConfig, SpectrumConfig};

    fn voiced_waveform() -> Waveform {
        let sample_rate = 22_050;
        let samples: Vec<f64> = (0..sample_rate)
            .map(|n| {
                let t = n as f64 / sample_rate as f64;
                0.5 * (2.0 * std::f64::consts::PI * 180.0 * t).sin()
                    + 0.2 * (2.0 * std::f64::consts::PI * 360.0 * t).sin()
            })
            .collect();
        Waveform::new(samples, sample_rate as u32)
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let waveform = voiced_waveform();
        let sequential = FeatureExtractor::default()
            .with_parallel(false)
            .extract(&waveform)
            .unwrap();
        let parallel = FeatureExtractor::default()
            .with_parallel(true)
            .extract(&waveform)
            .unwrap();
        for ((key, a), (_, b)) in sequential.entries().iter().zip(parallel.entries()) {
            assert_eq!(a.to_bits(), b.to_bits(), "{key} differs");
        }
    }

    #[test]
    fn invalid_waveform_fails_closed() {
        let waveform = Waveform::new(vec![0.0, f64::INFINITY], 22_050);
        assert!(matches!(
            FeatureExtractor::default().extract(&waveform),
            Err(AnalysisError::InvalidWaveform(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.pitch.frame_length = 0;
        assert!(matches!(
            FeatureExtractor::from_config(&config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn analyzers_reject_unusable_framing() {
        let dominant = DominantConfig {
            frame_length: 0,
            ..DominantConfig::default()
        };
        assert!(matches!(
            DominantFrequencyTracker::new(dominant),
            Err(AnalysisError::InvalidConfig(_))
        ));
        let spectrum = SpectrumConfig {
            hop_length: 0,
            ..SpectrumConfig::default()
        };
        assert!(SpectrumAnalyzer::new(spectrum).is_err());
        let pitch = PitchConfig {
            max_frequency: 40.0,
            ..PitchConfig::default()
        };
        assert!(PitchTracker::new(pitch).is_err());
    }

    #[test]
    fn injected_analyzers_run_without_config() {
        let extractor = FeatureExtractor::new(
            SpectrumAnalyzer::new(SpectrumConfig::default()).unwrap(),
            PitchTracker::new(PitchConfig::default()).unwrap(),
            DominantFrequencyTracker::new(DominantConfig::default()).unwrap(),
        );
        let record = extractor.extract(&voiced_waveform()).unwrap();
        assert!((record.meanfun - 0.18).abs() < 0.01, "meanfun {}", record.meanfun);
    }

    #[test]
    fn resamples_to_analysis_rate() {
        let waveform = Waveform::new(vec![0.0; 44_100], 44_100);
        let report = FeatureExtractor::default().analyze(&waveform).unwrap();
        assert!((report.pitch.duration - 1.0).abs() < 1e-3);
        let native = FeatureExtractor::default()
            .with_analysis_sample_rate(None)
            .analyze(&waveform)
            .unwrap();
        assert!(native.pitch.frames.len() > report.pitch.frames.len());
    }
}
