use std::path::PathBuf;

use thiserror::Error;

/// Failures of the external speech-synthesis capability.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The transient text artifact could not be written; the engine was never
    /// invoked.
    #[error("failed to write synthesis input text: {0}")]
    ArtifactWriteFailed(#[source] std::io::Error),
    /// The engine exited non-zero, could not be spawned, or produced no
    /// output file. `detail` carries the captured diagnostic output.
    #[error("speech synthesis failed: {detail}")]
    SynthesisFailed { detail: String },
}

/// Failures of the three-track mix.
#[derive(Debug, Error)]
pub enum MixError {
    #[error("jingle asset missing: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("audio encoding failed: {detail}")]
    EncodingFailed { detail: String },
}

/// Everything the generate pipeline can surface to a caller.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// User-correctable: resubmit with text.
    #[error("announcement text is empty")]
    EmptyText,
    /// Deployment fault: a fixed jingle asset is gone. Checked before any
    /// synthesis work is spent.
    #[error("jingle asset missing: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Mix(#[from] MixError),
}

/// Rejections when registering a schedule entry.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("time must be HH:MM, got {0:?}")]
    InvalidTime(String),
    #[error("one-off schedules require a date")]
    MissingDate,
}
