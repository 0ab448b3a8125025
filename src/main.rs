use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use voiceprops::audio::{SymphoniaSource, WaveformSource};
use voiceprops::cli::{self, Args};
use voiceprops::{logging, FeatureExtractor};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Err(err) = logging::init(args.verbose) {
        eprintln!("warning: logging disabled: {err}");
    }

    args.validate()
        .context("Failed to validate command-line arguments")?;
    let config = args
        .analysis_config()
        .context("Failed to load analysis configuration")?;
    let extractor = FeatureExtractor::from_config(&config)?;

    info!(input = %args.input_file.display(), "decoding input audio");
    let waveform = SymphoniaSource
        .load(&args.input_file)
        .context("Failed to decode input audio")?;
    info!(
        samples = waveform.len(),
        sample_rate = waveform.sample_rate,
        "loaded waveform"
    );

    let mut record = extractor
        .extract(&waveform)
        .context("Feature extraction failed")?;
    if let Some(label) = args.label {
        record = record.with_label(label);
    }

    let rendered = cli::render(&record, args.format)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(rendered.as_bytes())
        .context("Failed to write feature record")?;
    Ok(())
}
