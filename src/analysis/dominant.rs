use realfft::RealFftPlanner;
use tracing::{debug, warn};

use super::framing::{frames, hann_window};
use super::statistics::argmax;
use crate::config::DominantConfig;
use crate::error::{AnalysisError, Result};
use crate::types::{DominantFrame, TrackSummary, Waveform};

/// Dominant frequency of every frame whose spectral peak clears the floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DominantTrack {
    pub frames: Vec<DominantFrame>,
}

impl DominantTrack {
    pub fn frequencies(&self) -> Vec<f64> {
        self.frames.iter().map(|frame| frame.frequency).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn summary(&self) -> TrackSummary {
        TrackSummary::from_values(&self.frequencies())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DominantFrequencyTracker {
    config: DominantConfig,
}

impl DominantFrequencyTracker {
    pub fn new(config: DominantConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn track(&self, waveform: &Waveform) -> Result<DominantTrack> {
        let fft_size = self.config.frame_length;
        let fft = RealFftPlanner::<f64>::new().plan_fft_forward(fft_size);
        let window = hann_window(fft_size);
        let bin_width = waveform.sample_rate as f64 / fft_size as f64;
        let mut input = fft.make_input_vec();
        let mut spectrum = fft.make_output_vec();

        let mut track = DominantTrack::default();
        let mut rejected = 0usize;
        for frame in frames(&waveform.samples, fft_size, self.config.hop_length) {
            // trailing frames are zero-padded to the full FFT size
            input.fill(0.0);
            for ((slot, sample), weight) in input.iter_mut().zip(frame.samples).zip(&window) {
                *slot = sample * weight;
            }
            fft.process(&mut input, &mut spectrum)
                .map_err(|err| AnalysisError::Fft {
                    len: fft_size,
                    message: err.to_string(),
                })?;

            let magnitudes: Vec<f64> = spectrum.iter().skip(1).map(|c| c.norm()).collect();
            let Some(offset) = argmax(&magnitudes) else {
                continue;
            };
            let magnitude = magnitudes[offset];
            if magnitude <= self.config.min_magnitude {
                rejected += 1;
                continue;
            }
            track.frames.push(DominantFrame {
                index: frame.index,
                time: frame.time(waveform.sample_rate),
                frequency: (offset + 1) as f64 * bin_width,
                magnitude,
            });
        }

        if track.is_empty() {
            warn!(rejected, "no frame cleared the dominant-frequency floor");
        }
        debug!(frames = track.frames.len(), rejected, "dominant frequencies tracked");
        Ok(track)
    }
}
