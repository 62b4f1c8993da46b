//! Error types
//!
//! Request-level and startup-level failures. Per-chunk transcription failures
//! are not errors here: they travel as [`TranscriptionResult::Error`] values
//! and end up in the reply text.
//!
//! [`TranscriptionResult::Error`]: crate::transcription::TranscriptionResult::Error

use thiserror::Error;

/// Errors that abort handling of a single voice message, or startup.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("audio has zero duration")]
    EmptyAudio,

    #[error("encoding segment {index} failed: {reason}")]
    EncodingFailed { index: usize, reason: String },

    #[error("failed to probe audio duration: {0}")]
    Probe(String),

    #[error("failed to download voice file: {0}")]
    Download(String),

    #[error("required configuration is missing: {0}")]
    ConfigurationMissing(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Stable short code, used as a structured logging field.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyAudio => ErrorCode::EmptyAudio,
            Self::EncodingFailed { .. } | Self::Probe(_) => ErrorCode::EncodingFailed,
            Self::Download(_) => ErrorCode::Download,
            Self::ConfigurationMissing(_) | Self::InvalidConfiguration(_) => {
                ErrorCode::Configuration
            }
            Self::Io(_) => ErrorCode::Io,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    EmptyAudio,
    EncodingFailed,
    Download,
    Configuration,
    Io,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::EmptyAudio => "empty_audio",
            Self::EncodingFailed => "encoding_failed",
            Self::Download => "download",
            Self::Configuration => "configuration",
            Self::Io => "io",
        };
        f.write_str(code)
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
