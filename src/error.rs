use std::path::PathBuf;

use crate::language::LanguageCode;
use crate::pipeline::RunStatus;

/// Input rejected before a run starts. No state is created when these fire.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter some text to synthesize.")]
    EmptyText,
    #[error("Please enter a filename for the output.")]
    EmptyFileName,
    #[error("Save directory {0:?} does not exist or is not a directory.")]
    InvalidDirectory(PathBuf),
    #[error("Speed {0} is outside the supported range 0.5–2.0.")]
    SpeedOutOfRange(f32),
    #[error("Maximum words per chunk must be at least 1.")]
    InvalidMaxWords,
}

/// Errors raised by a synthesis backend, either while loading or while synthesizing.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("Model load failed: {0}")]
    Load(String),
    #[error("{0}")]
    Synthesis(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to create backend for language '{language}': {source}")]
    BackendInit {
        language: LanguageCode,
        #[source]
        source: BackendError,
    },
    #[error("Error in chunk {}: {source}", .segment + 1)]
    Synthesis {
        segment: usize,
        #[source]
        source: BackendError,
    },
    #[error("Chunk {} produced audio at {found} Hz, expected {expected} Hz", .segment + 1)]
    SampleRateMismatch {
        segment: usize,
        expected: u32,
        found: u32,
    },
    #[error("Generation cancelled")]
    Cancelled,
    #[error("No audio generated")]
    EmptyResult,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

impl PipelineError {
    /// The terminal status a run ends in when it stops with this error.
    pub fn status(&self) -> RunStatus {
        match self {
            PipelineError::Cancelled => RunStatus::Cancelled,
            _ => RunStatus::Failed,
        }
    }
}
