//! Fundamental frequency tracking by normalized autocorrelation.
//!
//! Each frame's autocorrelation is divided by its zero-lag energy, giving a
//! harmonic rate in [-1, 1] per candidate lag. After the lobe around lag 0
//! decays, the first local maximum that clears the harmonic threshold is taken
//! as the pitch period.

use tracing::{debug, warn};

use super::framing::{frames, Frame};
use crate::config::PitchConfig;
use crate::error::Result;
use crate::types::{PitchFrame, TrackSummary, Waveform};

/// Frames whose zero-lag energy falls below this are treated as silence.
const SILENCE_ENERGY: f64 = 1e-12;

/// Per-frame F0 estimates plus the analyzed duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchTrack {
    pub frames: Vec<PitchFrame>,
    /// Duration of the analyzed signal in seconds
    pub duration: f64,
}

impl PitchTrack {
    pub fn voiced_frequencies(&self) -> Vec<f64> {
        self.frames
            .iter()
            .filter(|frame| frame.voiced)
            .map(|frame| frame.frequency)
            .collect()
    }

    pub fn harmonic_rates(&self) -> Vec<f64> {
        self.frames.iter().map(|frame| frame.harmonic_rate).collect()
    }

    /// Best candidate lag per frame; unvoiced frames keep their strongest
    /// rejected candidate.
    pub fn argmins(&self) -> Vec<usize> {
        self.frames.iter().map(|frame| frame.lag).collect()
    }

    pub fn times(&self) -> Vec<f64> {
        self.frames.iter().map(|frame| frame.time).collect()
    }

    /// Statistics over voiced frames only.
    pub fn summary(&self) -> TrackSummary {
        TrackSummary::from_values(&self.voiced_frequencies())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PitchTracker {
    config: PitchConfig,
}

impl PitchTracker {
    /// Fails on an empty lag range or a threshold outside (0, 1].
    pub fn new(config: PitchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn track(&self, waveform: &Waveform) -> Result<PitchTrack> {
        let rate = waveform.sample_rate as f64;
        let max_lag = (rate / self.config.min_frequency).floor() as usize;
        let min_lag = ((rate / self.config.max_frequency).floor() as usize).max(1);

        let frames: Vec<PitchFrame> = frames(
            &waveform.samples,
            self.config.frame_length,
            self.config.hop_length,
        )
        .filter(|frame| frame.samples.len() > max_lag)
        .map(|frame| self.estimate(frame, waveform.sample_rate, min_lag, max_lag))
        .collect();

        let track = PitchTrack {
            frames,
            duration: waveform.duration().as_secs_f64(),
        };
        let voiced = track.frames.iter().filter(|frame| frame.voiced).count();
        if voiced == 0 {
            warn!(
                frames = track.frames.len(),
                "no voiced frames; fundamental frequency statistics are undefined"
            );
        }
        debug!(frames = track.frames.len(), voiced, min_lag, max_lag, "pitch tracked");
        Ok(track)
    }

    fn estimate(
        &self,
        frame: Frame<'_>,
        sample_rate: u32,
        min_lag: usize,
        max_lag: usize,
    ) -> PitchFrame {
        let mut estimate = PitchFrame {
            index: frame.index,
            time: frame.time(sample_rate),
            frequency: 0.0,
            harmonic_rate: 0.0,
            lag: 0,
            voiced: false,
        };

        let rates = match harmonic_rates(frame.samples, max_lag) {
            Some(rates) => rates,
            None => return estimate,
        };

        let search_start = decay_end(&rates).max(min_lag);
        if search_start >= max_lag {
            return estimate;
        }

        let threshold = self.config.harmonic_threshold;
        let voiced_lag = (search_start.max(1)..max_lag).find(|&lag| {
            rates[lag] >= threshold && rates[lag] >= rates[lag - 1] && rates[lag] >= rates[lag + 1]
        });

        match voiced_lag {
            Some(lag) => {
                estimate.lag = lag;
                estimate.harmonic_rate = rates[lag];
                estimate.frequency = sample_rate as f64 / lag as f64;
                estimate.voiced = true;
            }
            None => {
                let (lag, rate) = rates[search_start..max_lag]
                    .iter()
                    .enumerate()
                    .fold((search_start, f64::NEG_INFINITY), |best, (offset, &rate)| {
                        if rate > best.1 {
                            (search_start + offset, rate)
                        } else {
                            best
                        }
                    });
                estimate.lag = lag;
                estimate.harmonic_rate = rate;
            }
        }
        estimate
    }
}

/// Autocorrelation for lags `0..=max_lag` normalized by the zero-lag value,
/// `None` for a silent frame.
fn harmonic_rates(samples: &[f64], max_lag: usize) -> Option<Vec<f64>> {
    let energy: f64 = samples.iter().map(|s| s * s).sum();
    if energy <= SILENCE_ENERGY {
        return None;
    }
    let rates = (0..=max_lag)
        .map(|lag| {
            let correlation: f64 = samples
                .iter()
                .zip(&samples[lag..])
                .map(|(a, b)| a * b)
                .sum();
            correlation / energy
        })
        .collect();
    Some(rates)
}

/// First lag after the monotone decay from lag 0.
fn decay_end(rates: &[f64]) -> usize {
    let mut lag = 1;
    while lag < rates.len() && rates[lag] <= rates[lag - 1] {
        lag += 1;
    }
    lag - 1
}
