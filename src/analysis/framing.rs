/// One analysis frame borrowed from a waveform.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub index: usize,
    /// Offset of the first sample in the source waveform
    pub start: usize,
    pub samples: &'a [f64],
}

impl Frame<'_> {
    pub fn time(&self, sample_rate: u32) -> f64 {
        self.start as f64 / sample_rate as f64
    }
}

/// Split `samples` into frames of `frame_length` starting every `hop_length`
/// samples. Frames start at 0 and continue until the last start lies past the
/// end, so trailing frames may be shorter than `frame_length`.
pub fn frames(
    samples: &[f64],
    frame_length: usize,
    hop_length: usize,
) -> impl Iterator<Item = Frame<'_>> {
    let hop = hop_length.max(1);
    (0..samples.len())
        .step_by(hop)
        .enumerate()
        .map(move |(index, start)| {
            let end = (start + frame_length).min(samples.len());
            Frame {
                index,
                start,
                samples: &samples[start..end],
            }
        })
}

/// Symmetric Hann window.
pub fn hann_window(length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }
    let denom = (length - 1) as f64;
    (0..length)
        .map(|n| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * n as f64 / denom).cos()))
        .collect()
}
