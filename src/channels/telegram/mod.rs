//! Telegram Bot Integration
//!
//! Receives voice notes through a teloxide dispatcher and replies with the
//! transcript.

mod agent;
mod gateway;
pub(crate) mod handler;

pub use agent::TelegramAgent;
pub use gateway::TelegramGateway;

/// Base URL for Telegram file downloads.
pub(crate) const TELEGRAM_FILE_URL: &str = "https://api.telegram.org/file";
