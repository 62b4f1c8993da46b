//! voxrelay - Telegram voice message transcription relay
//!
//! Receives voice notes from a Telegram bot, splits them into segments short
//! enough for Yandex SpeechKit's synchronous recognizer, transcribes all
//! segments concurrently, and replies with one message holding the joined
//! transcript.
//!
//! ## Quick Start
//!
//! ```bash
//! export TELEGRAM_BOT_TOKEN=... YANDEX_IAM_TOKEN=... YANDEX_FOLDER_ID=...
//!
//! # Run the bot
//! voxrelay
//!
//! # Transcribe a local file
//! voxrelay transcribe voice.oga
//! ```
//!
//! Requires `ffmpeg` and `ffprobe` on `PATH` (or configured explicitly).

pub mod audio;
pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod relay;
pub mod transcription;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorCode, RelayError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
