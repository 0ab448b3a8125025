use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::types::Waveform;

/// Anything able to turn a file on disk into a mono waveform.
pub trait WaveformSource {
    fn load(&self, path: &Path) -> Result<Waveform>;
}

/// Default source backed by symphonia's probe and codec registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaSource;

impl WaveformSource for SymphoniaSource {
    fn load(&self, path: &Path) -> Result<Waveform> {
        decode_audio(path)
    }
}

/// Decode an audio file to a mono waveform, averaging all channels.
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    let path = path.as_ref();

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;
    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate not specified in audio file")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut mono = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err).context("Failed to read packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!(reason = %reason, "skipping undecodable packet");
                continue;
            }
            Err(err) => return Err(err).context("Failed to decode audio packet"),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let frames = decoded.capacity();
        let too_small = buffer
            .as_ref()
            .map_or(true, |existing| existing.capacity() < frames * channels);
        if too_small {
            buffer = Some(SampleBuffer::<f32>::new(frames as u64, spec));
        }
        if let Some(sample_buffer) = buffer.as_mut() {
            sample_buffer.copy_interleaved_ref(decoded);
            mix_to_mono(sample_buffer.samples(), channels, &mut mono);
        }
    }

    debug!(
        path = %path.display(),
        samples = mono.len(),
        sample_rate,
        "decoded audio"
    );
    Ok(Waveform::from_pcm(&mono, sample_rate))
}

/// Average interleaved frames down to one channel.
fn mix_to_mono(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
