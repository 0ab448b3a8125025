//! Acoustic feature extraction for voice classification.
//!
//! A decoded mono [`Waveform`] runs through three independent analyzers
//! (global spectrum, autocorrelation pitch tracking, per-frame dominant
//! frequency) plus a modulation index, and the results are flattened into one
//! [`FeatureRecord`].

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod types;

pub use analysis::FeatureExtractor;
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use record::{FeatureRecord, FEATURE_KEYS};
pub use types::Waveform;
