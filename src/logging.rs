//! Logging
//!
//! `tracing` subscriber setup: stderr always, plus a log file in debug mode
//! or when a file is configured.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "voxrelay.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    level: String,
    debug_mode: bool,
    log_dir: PathBuf,
    log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            debug_mode: false,
            log_dir: default_log_dir(),
            log_file: None,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Debug mode raises the level to `debug` and writes daily log files.
    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_log_file(mut self, file: Option<PathBuf>) -> Self {
        self.log_file = file;
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn filter(&self) -> EnvFilter {
        let level = if self.debug_mode { "debug" } else { self.level.as_str() };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// ./.voxrelay/logs
pub fn default_log_dir() -> PathBuf {
    PathBuf::from(".voxrelay").join("logs")
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process so buffered file output is flushed.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let (file_writer, guard) = match file_appender(&config)? {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn file_appender(config: &LogConfig) -> Result<Option<tracing_appender::rolling::RollingFileAppender>> {
    if let Some(file) = &config.log_file {
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = file
            .file_name()
            .with_context(|| format!("Log file path has no file name: {:?}", file))?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
        return Ok(Some(tracing_appender::rolling::never(dir, name)));
    }

    if config.debug_mode {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;
        return Ok(Some(tracing_appender::rolling::daily(
            &config.log_dir,
            LOG_FILE_PREFIX,
        )));
    }

    Ok(None)
}

/// Delete rotated log files in `log_dir` older than `max_age_days`.
/// Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, max_age_days: u64) -> std::io::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let max_age = Duration::from_secs(max_age_days * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let is_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    Ok(removed)
}
