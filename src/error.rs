use thiserror::Error;

/// Common result type for model evaluation.
pub type Result<T> = std::result::Result<T, VernierError>;

/// Errors raised by the track model, its extractors, and configuration loading.
#[derive(Debug, Error)]
pub enum VernierError {
    /// The sampled waveform never crossed zero in the requested direction.
    /// `position` is filled in by the sweep driver.
    #[error("no zero crossing found{}", at_suffix(.position))]
    NoCrossingFound { position: Option<f64> },

    /// Rejected at construction, before any computation runs.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("time and value samples differ in length ({times} vs {values})")]
    LengthMismatch { times: usize, values: usize },

    /// Time samples must be monotonically increasing.
    #[error("time samples decrease at index {index}")]
    UnorderedSamples { index: usize },

    #[error("no samples to analyse")]
    EmptySamples,

    /// Correlation energy was zero, so no phase is defined.
    #[error("waveform carries no signal at the reference frequency")]
    NoSignal,

    #[error("FFT failed: {0}")]
    Fft(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn at_suffix(position: &Option<f64>) -> String {
    match position {
        Some(p) => format!(" at reader position {p}"),
        None => String::new(),
    }
}

impl VernierError {
    /// Attach the reader position to a `NoCrossingFound` error.
    pub(crate) fn at_position(self, position: f64) -> Self {
        match self {
            VernierError::NoCrossingFound { .. } => VernierError::NoCrossingFound {
                position: Some(position),
            },
            other => other,
        }
    }
}
