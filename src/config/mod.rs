//! Configuration Module
//!
//! Loads configuration once at startup and hands it to the components that
//! need it. There is no global config state.

mod types;

pub use types::{
    AudioConfig, DEFAULT_SPEECHKIT_URL, LoggingConfig, SpeechKitConfig, TelegramConfig,
};

use crate::error::RelayError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Speech recognition backend settings
    #[serde(default)]
    pub speechkit: SpeechKitConfig,

    /// Segmentation and transcoding settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credentials required to talk to SpeechKit, checked at startup.
#[derive(Debug, Clone)]
pub struct SpeechKitCredentials {
    pub iam_token: String,
    pub folder_id: String,
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config (~/.config/voxrelay/config.toml)
    /// 3. Local config (./voxrelay.toml)
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_config_path) = Self::system_config_path()
            && system_config_path.exists()
        {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::from_file(&system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::from_file(&local_config_path)?;
        }

        config.apply_env_overrides()?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Get the system config path: ~/.config/voxrelay/config.toml
    pub fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voxrelay").join("config.toml"))
    }

    /// Get the local config path: ./voxrelay.toml
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("./voxrelay.toml")
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup. Environment variables in production,
    /// a plain map in tests.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.token = Some(token);
        }

        // SpeechKit
        if let Some(token) = lookup("YANDEX_IAM_TOKEN") {
            self.speechkit.iam_token = Some(token);
        }
        if let Some(folder) = lookup("YANDEX_FOLDER_ID") {
            self.speechkit.folder_id = Some(folder);
        }
        if let Some(url) = lookup("VOXRELAY_SPEECHKIT_URL") {
            self.speechkit.endpoint = url;
        }
        if let Some(lang) = lookup("VOXRELAY_SPEECHKIT_LANG") {
            self.speechkit.lang = Some(lang);
        }
        if let Some(secs) = lookup("VOXRELAY_REQUEST_TIMEOUT_SECS") {
            self.speechkit.request_timeout_secs = parse_secs("VOXRELAY_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        // Audio
        if let Some(secs) = lookup("VOXRELAY_MAX_SEGMENT_SECS") {
            self.audio.max_segment_secs = parse_secs("VOXRELAY_MAX_SEGMENT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("VOXRELAY_MAX_VOICE_SECS") {
            self.audio.max_voice_secs = parse_secs("VOXRELAY_MAX_VOICE_SECS", &secs)?;
        }
        if let Some(path) = lookup("VOXRELAY_FFMPEG_PATH") {
            self.audio.ffmpeg_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("VOXRELAY_FFPROBE_PATH") {
            self.audio.ffprobe_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup("VOXRELAY_WORK_DIR") {
            self.audio.work_dir = PathBuf::from(dir);
        }

        // Logging
        if let Some(level) = lookup("VOXRELAY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(file) = lookup("VOXRELAY_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        if self.audio.max_segment_secs == 0 {
            return Err(RelayError::InvalidConfiguration(
                "audio.max_segment_secs must be greater than zero".to_string(),
            )
            .into());
        }

        if self.audio.max_voice_secs == 0 {
            return Err(RelayError::InvalidConfiguration(
                "audio.max_voice_secs must be greater than zero".to_string(),
            )
            .into());
        }

        if self.speechkit.request_timeout_secs == 0 {
            return Err(RelayError::InvalidConfiguration(
                "speechkit.request_timeout_secs must be greater than zero".to_string(),
            )
            .into());
        }

        if self.speechkit.endpoint.is_empty() {
            return Err(RelayError::InvalidConfiguration(
                "speechkit.endpoint is empty".to_string(),
            )
            .into());
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// SpeechKit credentials, or `ConfigurationMissing` naming the first absent one.
    pub fn require_speechkit(&self) -> std::result::Result<SpeechKitCredentials, RelayError> {
        let iam_token = non_empty(&self.speechkit.iam_token)
            .ok_or(RelayError::ConfigurationMissing("YANDEX_IAM_TOKEN"))?;
        let folder_id = non_empty(&self.speechkit.folder_id)
            .ok_or(RelayError::ConfigurationMissing("YANDEX_FOLDER_ID"))?;

        Ok(SpeechKitCredentials {
            iam_token: iam_token.to_string(),
            folder_id: folder_id.to_string(),
        })
    }

    /// Telegram bot token, or `ConfigurationMissing`.
    pub fn require_telegram(&self) -> std::result::Result<String, RelayError> {
        non_empty(&self.telegram.token)
            .map(str::to_string)
            .ok_or(RelayError::ConfigurationMissing("TELEGRAM_BOT_TOKEN"))
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, value))
}
