use aus::spectrum;
use aus::WindowType;

use super::statistics::mean;
use crate::types::Waveform;

/// Power floor applied before taking logs for flatness.
const POWER_FLOOR: f64 = 1e-10;

/// Hann-windowed magnitude spectrogram with centered framing.
pub(crate) struct ShortTimeSpectrum {
    frequencies: Vec<f64>,
    magnitude: Vec<Vec<f64>>,
}

impl ShortTimeSpectrum {
    pub(crate) fn compute(waveform: &Waveform, fft_size: usize, hop_size: usize) -> Self {
        let frequencies = spectrum::rfftfreq(fft_size, waveform.sample_rate);
        if waveform.is_empty() {
            return Self {
                frequencies,
                magnitude: Vec::new(),
            };
        }

        let padded = center_pad(&waveform.samples, fft_size);
        let stft = spectrum::rstft(&padded, fft_size, hop_size, WindowType::Hanning);
        let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
        Self {
            frequencies,
            magnitude,
        }
    }

    pub(crate) fn frame_count(&self) -> usize {
        self.magnitude.len()
    }

    /// Mean over frames of geometric / arithmetic mean of the power spectrum.
    pub(crate) fn mean_flatness(&self) -> f64 {
        let per_frame: Vec<f64> = self.magnitude.iter().map(|frame| flatness(frame)).collect();
        mean(&per_frame)
    }

    /// Mean over frames of the magnitude-weighted frequency centroid in Hz.
    pub(crate) fn mean_centroid(&self) -> f64 {
        let per_frame: Vec<f64> = self
            .magnitude
            .iter()
            .map(|frame| centroid(frame, &self.frequencies))
            .collect();
        mean(&per_frame)
    }
}

/// Zero-pad half a frame on each side so frames are centered on their hop.
fn center_pad(samples: &[f64], fft_size: usize) -> Vec<f64> {
    let pad = fft_size / 2;
    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.resize(pad, 0.0);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + 2 * pad, 0.0);
    if padded.len() < fft_size {
        padded.resize(fft_size, 0.0);
    }
    padded
}

fn flatness(magnitude: &[f64]) -> f64 {
    if magnitude.is_empty() {
        return f64::NAN;
    }
    let count = magnitude.len() as f64;
    let (log_sum, sum) = magnitude.iter().fold((0.0, 0.0), |(log_sum, sum), &m| {
        let power = (m * m).max(POWER_FLOOR);
        (log_sum + power.ln(), sum + power)
    });
    let geometric = (log_sum / count).exp();
    let arithmetic = sum / count;
    geometric / arithmetic
}

fn centroid(magnitude: &[f64], frequencies: &[f64]) -> f64 {
    let total: f64 = magnitude.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    magnitude
        .iter()
        .zip(frequencies)
        .map(|(m, f)| m * f)
        .sum::<f64>()
        / total
}
