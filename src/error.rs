/// Convenient alias for results returned by the analysis modules.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures that abort a feature extraction. Degenerate signals (silence,
/// no voiced frames, flat dominant track) are not errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid waveform: {0}")]
    InvalidWaveform(String),
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error("FFT of length {len} failed: {message}")]
    Fft { len: usize, message: String },
    /// An analyzer produced an infinite value where a finite or NaN one was
    /// expected.
    #[error("feature `{key}` is not finite ({value})")]
    NonFinite { key: &'static str, value: f64 },
    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}
