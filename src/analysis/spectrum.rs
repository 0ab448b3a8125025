//! Whole-signal spectral statistics.
//!
//! The global spectrum is a one-sided real FFT over every sample, treated as a
//! probability mass over frequency bins. Spread and shape statistics (standard
//! deviation, skewness, kurtosis) are taken over the frequency axis itself and
//! are not amplitude-weighted; downstream models were trained on exactly these
//! values. Quantiles land one bin past the cumulative-mass crossing for the
//! same reason.

use ndarray::Array1;
use realfft::RealFftPlanner;
use tracing::{debug, warn};

use super::short_time::ShortTimeSpectrum;
use super::statistics::{
    argmax, cumulative_crossing, cumulative_sum, shannon_entropy, Moments,
};
use crate::config::SpectrumConfig;
use crate::error::{AnalysisError, Result};
use crate::types::Waveform;

/// One-sided magnitude spectrum with its frequency axis in Hz.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub frequencies: Array1<f64>,
    pub magnitudes: Array1<f64>,
}

impl Spectrum {
    /// Real FFT of the whole waveform. An empty waveform has no bins.
    pub fn of_waveform(waveform: &Waveform) -> Result<Self> {
        let len = waveform.len();
        if len == 0 {
            return Ok(Self {
                frequencies: Array1::zeros(0),
                magnitudes: Array1::zeros(0),
            });
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(len);
        let mut input = fft.make_input_vec();
        input.copy_from_slice(&waveform.samples);
        let mut output = fft.make_output_vec();
        fft.process(&mut input, &mut output)
            .map_err(|err| AnalysisError::Fft {
                len,
                message: err.to_string(),
            })?;

        let bin_width = waveform.sample_rate as f64 / len as f64;
        let frequencies = Array1::from_iter((0..output.len()).map(|k| k as f64 * bin_width));
        let magnitudes = Array1::from_iter(output.iter().map(|c| c.norm()));
        Ok(Self {
            frequencies,
            magnitudes,
        })
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Magnitudes normalized to unit mass, `None` when the spectrum carries
    /// no energy.
    pub fn amplitude_distribution(&self) -> Option<Array1<f64>> {
        let total = self.magnitudes.sum();
        (total > 0.0).then(|| &self.magnitudes / total)
    }
}

/// Spectral statistics in Hz (frequency-valued) or dimensionless units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralStatistics {
    pub mean_frequency: f64,
    pub standard_deviation: f64,
    pub median_frequency: f64,
    pub q25: f64,
    pub q75: f64,
    pub iqr: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub entropy: f64,
    pub mode_frequency: f64,
    pub peak_frequency: f64,
    pub mean_flatness: f64,
    pub mean_centroid: f64,
}

/// Stateless analyzer producing [`SpectralStatistics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectrumAnalyzer {
    config: SpectrumConfig,
}

impl SpectrumAnalyzer {
    /// Rejects a config whose framing or thresholds cannot be analyzed.
    pub fn new(config: SpectrumConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn analyze(&self, waveform: &Waveform) -> Result<SpectralStatistics> {
        let spectrum = Spectrum::of_waveform(waveform)?;
        let mut stats = distribution_statistics(&spectrum);

        let short_time = ShortTimeSpectrum::compute(
            waveform,
            self.config.frame_length,
            self.config.hop_length,
        );
        stats.mean_flatness = short_time.mean_flatness();
        stats.mean_centroid = short_time.mean_centroid();

        debug!(
            bins = spectrum.len(),
            frames = short_time.frame_count(),
            peak_hz = stats.peak_frequency,
            "spectrum analyzed"
        );
        Ok(stats)
    }
}

/// Statistics of the global spectrum. Short-time fields are left NaN.
pub fn distribution_statistics(spectrum: &Spectrum) -> SpectralStatistics {
    let frequencies = &spectrum.frequencies;
    let (standard_deviation, skewness, kurtosis) = match Moments::of(frequencies) {
        Some(moments) => (moments.std_dev(), moments.skewness(), moments.kurtosis()),
        None => (f64::NAN, f64::NAN, f64::NAN),
    };

    let mut stats = SpectralStatistics {
        mean_frequency: 0.0,
        standard_deviation,
        median_frequency: 0.0,
        q25: 0.0,
        q75: 0.0,
        iqr: 0.0,
        skewness,
        kurtosis,
        entropy: 0.0,
        mode_frequency: 0.0,
        peak_frequency: 0.0,
        mean_flatness: f64::NAN,
        mean_centroid: f64::NAN,
    };

    let Some(amplitudes) = spectrum.amplitude_distribution() else {
        warn!("spectrum has no energy; reporting zero-valued distribution statistics");
        return stats;
    };

    let cumulative = cumulative_sum(&amplitudes);
    let peak = argmax(&amplitudes).map_or(0.0, |index| frequencies[index]);

    stats.mean_frequency = frequencies.dot(&amplitudes);
    stats.peak_frequency = peak;
    stats.mode_frequency = peak;
    stats.median_frequency = cumulative_crossing(frequencies, &cumulative, 0.5);
    stats.q25 = cumulative_crossing(frequencies, &cumulative, 0.25);
    stats.q75 = cumulative_crossing(frequencies, &cumulative, 0.75);
    stats.iqr = stats.q75 - stats.q25;
    stats.entropy = shannon_entropy(&amplitudes);
    stats
}
