//! Transcription Module
//!
//! The per-chunk speech-to-text boundary. Every failure past this point is a
//! value, never an error.

mod speechkit;

pub use speechkit::SpeechKitClient;

use crate::audio::AudioChunk;
use async_trait::async_trait;

/// Outcome of transcribing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionResult {
    Text(String),
    Error(String),
}

impl TranscriptionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Recognized text, or the error message.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Error(text) => text,
        }
    }
}

/// Sends one chunk to a speech-to-text backend.
///
/// Implementations make at most one outbound call per invocation and never
/// retry. Timeouts belong to the caller.
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    async fn transcribe(&self, chunk: &AudioChunk) -> TranscriptionResult;
}
