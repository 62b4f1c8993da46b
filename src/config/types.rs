//! Configuration section types and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SPEECHKIT_URL: &str = "https://stt.api.cloud.yandex.net/speech/v1/stt:recognize";

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather (loaded from TELEGRAM_BOT_TOKEN env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Yandex SpeechKit STT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechKitConfig {
    /// IAM token used as the bearer credential (YANDEX_IAM_TOKEN)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_token: Option<String>,

    /// Cloud folder the requests are billed to (YANDEX_FOLDER_ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    /// Recognition endpoint
    #[serde(default = "default_speechkit_url")]
    pub endpoint: String,

    /// Recognition language, e.g. "ru-RU". Service default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_speechkit_url() -> String {
    DEFAULT_SPEECHKIT_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SpeechKitConfig {
    fn default() -> Self {
        Self {
            iam_token: None,
            folder_id: None,
            endpoint: default_speechkit_url(),
            lang: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SpeechKitConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Audio segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Longest chunk sent to the recognizer, in seconds (default: 30).
    ///
    /// SpeechKit documents 30 s as the synchronous limit, but in practice it
    /// has been seen rejecting clips longer than about 7 s. Lower this if
    /// chunks come back with errors.
    #[serde(default = "default_max_segment_secs")]
    pub max_segment_secs: u64,

    /// Longest voice message accepted at all, in seconds (default: 300)
    #[serde(default = "default_max_voice_secs")]
    pub max_voice_secs: u64,

    /// Path to the ffmpeg binary; looked up on PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to the ffprobe binary; looked up on PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<PathBuf>,

    /// Directory for downloaded voice files and encoded chunks
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_max_segment_secs() -> u64 {
    30
}

fn default_max_voice_secs() -> u64 {
    300
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("voxrelay")
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_segment_secs: default_max_segment_secs(),
            max_voice_secs: default_max_voice_secs(),
            ffmpeg_path: None,
            ffprobe_path: None,
            work_dir: default_work_dir(),
        }
    }
}

impl AudioConfig {
    pub fn max_segment(&self) -> Duration {
        Duration::from_secs(self.max_segment_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
