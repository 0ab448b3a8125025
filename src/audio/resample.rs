//! Band-limited sample-rate conversion to the analysis rate.

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::types::Waveform;

/// Input frames handed to the resampler per call.
const CHUNK_SIZE: usize = 1024;
/// FFT sub-chunks per chunk; more sub-chunks shorten the filter delay.
const SUB_CHUNKS: usize = 2;

/// Resample mono `samples` from `source_rate` to `target_rate`.
///
/// The FFT resampler low-passes below the smaller Nyquist frequency, so
/// content the target rate cannot represent is removed instead of folding
/// back into the band. The output is aligned with the input (filter delay
/// removed) and has `ceil(len * target / source)` samples.
pub fn resample(samples: &[f64], source_rate: u32, target_rate: u32) -> Result<Vec<f64>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(AnalysisError::InvalidWaveform(format!(
            "cannot resample from {source_rate} Hz to {target_rate} Hz"
        )));
    }
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f64>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1,
    )
    .map_err(|err| AnalysisError::Resample(err.to_string()))?;

    let delay = resampler.output_delay();
    let expected =
        (samples.len() as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;
    let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut chunk = Vec::with_capacity(CHUNK_SIZE);
    let mut position = 0;

    // past the end of the input the resampler is fed silence until the
    // delayed tail has been flushed
    while output.len() < expected + delay {
        let needed = resampler.input_frames_next();
        chunk.clear();
        chunk.resize(needed, 0.0);
        let end = (position + needed).min(samples.len());
        if position < end {
            chunk[..end - position].copy_from_slice(&samples[position..end]);
        }
        position += needed;

        let processed = resampler
            .process(&[chunk.as_slice()], None)
            .map_err(|err| AnalysisError::Resample(err.to_string()))?;
        output.extend_from_slice(&processed[0]);
    }

    output.drain(..delay);
    output.truncate(expected);
    debug!(
        from = source_rate,
        to = target_rate,
        input = samples.len(),
        output = output.len(),
        delay,
        "resampled"
    );
    Ok(output)
}

/// Bring `waveform` to `target_rate`, reusing the shared buffer when the
/// rate already matches.
pub fn to_rate(waveform: &Waveform, target_rate: u32) -> Result<Waveform> {
    if waveform.sample_rate == target_rate {
        return Ok(waveform.clone());
    }
    let samples = resample(&waveform.samples, waveform.sample_rate, target_rate)?;
    Ok(Waveform::new(samples, target_rate))
}
