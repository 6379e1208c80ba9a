//! Error types shared by the assessment and video subsystems.

use std::fmt;

use thiserror::Error;

/// Stage of the video pipeline an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStage {
    /// Work directory creation and input checks
    Prepare,
    /// Frame rasterization and PNG writes
    Render,
    /// Concat manifest write
    Manifest,
    /// External encoder invocation
    Encode,
    /// Moving the finished file to the caller's path
    Finalize,
    /// Work directory removal
    Cleanup,
}

impl fmt::Display for VideoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prepare => "prepare",
            Self::Render => "render",
            Self::Manifest => "manifest",
            Self::Encode => "encode",
            Self::Finalize => "finalize",
            Self::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Errors raised by fluency computations and video rendering
#[derive(Error, Debug)]
pub enum FluencyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Text measurement unavailable: {0}")]
    MeasurementFailure(String),

    #[error("Encoding failed during {stage}: {message}")]
    EncodingFailure { stage: VideoStage, message: String },

    #[error("Storage failure during {stage}: {message}")]
    StorageFailure { stage: VideoStage, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl FluencyError {
    /// Build a storage failure for `stage`
    pub fn storage(stage: VideoStage, message: impl Into<String>) -> Self {
        Self::StorageFailure {
            stage,
            message: message.into(),
        }
    }

    /// Build an encoding failure for `stage`
    pub fn encoding(stage: VideoStage, message: impl Into<String>) -> Self {
        Self::EncodingFailure {
            stage,
            message: message.into(),
        }
    }

    /// Pipeline stage the error belongs to, if it is stage-scoped
    #[must_use]
    pub fn stage(&self) -> Option<VideoStage> {
        match self {
            Self::EncodingFailure { stage, .. } | Self::StorageFailure { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FluencyError>;
