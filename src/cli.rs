use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use crate::config::AnalysisConfig;
use crate::record::FeatureRecord;

/// voiceprops - acoustic descriptors for voice classification
///
/// Decodes an audio file and prints spectral, fundamental-frequency and
/// dominant-frequency statistics as one flat feature record.
#[derive(Parser, Debug)]
#[command(name = "voiceprops")]
#[command(version)]
#[command(about = "Extract acoustic voice features from an audio file", long_about = None)]
pub struct Args {
    /// Input audio file path (supports MP3, OGG, FLAC, WAV, etc.)
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,

    /// Path to a JSON analysis configuration
    #[arg(long, value_name = "PATH", conflicts_with = "config_json")]
    pub config: Option<PathBuf>,

    /// Inline JSON analysis configuration
    #[arg(long, value_name = "JSON", conflicts_with = "config")]
    pub config_json: Option<String>,

    /// Label to attach to the record (placeholder 1 when omitted)
    #[arg(long)]
    pub label: Option<i64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Analyze at the file's own sample rate instead of resampling
    #[arg(long)]
    pub native_rate: bool,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<()> {
        if !self.input_file.exists() {
            bail!("Input file does not exist: {:?}", self.input_file);
        }
        if !self.input_file.is_file() {
            bail!("Input path is not a file: {:?}", self.input_file);
        }
        Ok(())
    }

    /// Resolve the analysis configuration from file, inline JSON or defaults,
    /// then apply command-line overrides.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config =
            load_config_from_sources(self.config.as_deref(), self.config_json.as_deref())?;
        if self.native_rate {
            config.analysis_sample_rate = None;
        }
        Ok(config)
    }
}

fn load_config_from_sources(path: Option<&Path>, json: Option<&str>) -> Result<AnalysisConfig> {
    if let Some(p) = path {
        return AnalysisConfig::load(p);
    }
    if let Some(raw) = json {
        return AnalysisConfig::from_json(raw).context("Failed to load inline config");
    }
    Ok(AnalysisConfig::default())
}

/// `key : value` lines rounded to three decimals, label as an integer.
pub fn render_text(record: &FeatureRecord) -> String {
    let mut out = String::new();
    for (key, value) in record.entries() {
        let _ = writeln!(out, "{key:>10} : {value:>10.3}");
    }
    let _ = writeln!(out, "{:>10} : {:>10}", "label", record.label);
    out
}

pub fn render(record: &FeatureRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(record)),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(record).context("Failed to serialize record")?;
            json.push('\n');
            Ok(json)
        }
    }
}
