//! CLI subcommands and config loading.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::audio::{AudioSegmenter, FfmpegTranscoder};
use crate::config::Config;
use crate::logging;
use crate::relay::{FanOutCoordinator, VoicePipeline};
use crate::transcription::SpeechKitClient;

use super::LogCommands;

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        Config::load_from_path(path)?
    } else {
        Config::load()?
    };

    config.validate()?;

    Ok(config)
}

/// Wire the transcoder, SpeechKit client and coordinator from configuration.
/// Fails when credentials or the ffmpeg binaries are missing.
pub(crate) fn build_pipeline(config: &Config) -> Result<VoicePipeline> {
    let credentials = config.require_speechkit()?;
    let transcoder = FfmpegTranscoder::from_config(&config.audio)?;
    let client = SpeechKitClient::from_config(&config.speechkit, credentials)?;

    tracing::info!(
        endpoint = %config.speechkit.endpoint,
        max_segment_secs = config.audio.max_segment_secs,
        "Transcription pipeline ready"
    );

    Ok(VoicePipeline::new(
        AudioSegmenter::new(Arc::new(transcoder), config.audio.work_dir.clone()),
        FanOutCoordinator::new(Arc::new(client)),
        config.audio.max_segment(),
    ))
}

/// Run the Telegram relay until Ctrl-C
#[cfg(feature = "telegram")]
pub(crate) async fn cmd_run(config: &Config) -> Result<()> {
    use crate::channels::telegram::{TelegramAgent, TelegramGateway};
    use crate::relay::VoiceRelay;
    use teloxide::Bot;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    let token = config.require_telegram()?;
    let pipeline = build_pipeline(config)?;

    let bot = Bot::new(token.clone());
    let gateway = Arc::new(TelegramGateway::new(bot.clone(), token));
    let relay = Arc::new(VoiceRelay::new(
        pipeline,
        gateway,
        config.audio.max_voice_secs,
        config.audio.work_dir.clone(),
    ));

    let (events_tx, events_rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            ctrl_c.cancel();
        }
    });

    let bot_task = TelegramAgent::new(bot, events_tx).start(cancel.clone());
    relay.listen(events_rx, cancel.clone()).await;

    cancel.cancel();
    bot_task.await.context("Telegram bot task failed")?;
    Ok(())
}

#[cfg(not(feature = "telegram"))]
pub(crate) async fn cmd_run(_config: &Config) -> Result<()> {
    anyhow::bail!("voxrelay was built without the `telegram` feature")
}

/// Transcribe a local file through the same pipeline the bot uses
pub(crate) async fn cmd_transcribe(config: &Config, file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Audio file not found: {}", file.display());
    }

    let pipeline = build_pipeline(config)?;
    let reply = pipeline
        .run(file)
        .await
        .with_context(|| format!("Failed to process {}", file.display()))?;

    println!("{}", reply.text());

    if reply.is_failure() {
        anyhow::bail!("One or more segments failed to transcribe");
    }
    Ok(())
}

/// Initialize configuration file
pub(crate) fn cmd_init(_config: &Config, force: bool) -> Result<()> {
    let config_path =
        Config::system_config_path().context("Could not determine config directory")?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("Configuration initialized at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Set TELEGRAM_BOT_TOKEN, YANDEX_IAM_TOKEN and YANDEX_FOLDER_ID (or edit the file)");
    println!("   2. Run 'voxrelay' to start the bot");

    Ok(())
}

/// Show configuration
pub(crate) fn cmd_config(config: &Config, show_secrets: bool) -> Result<()> {
    if show_secrets {
        println!("{:#?}", config);
        return Ok(());
    }

    let set = |value: &Option<String>| if value.is_some() { "[SET]" } else { "[NOT SET]" };

    println!("voxrelay configuration\n");
    println!("Telegram token:    {}", set(&config.telegram.token));
    println!("SpeechKit token:   {}", set(&config.speechkit.iam_token));
    println!("SpeechKit folder:  {}", set(&config.speechkit.folder_id));
    println!("SpeechKit URL:     {}", config.speechkit.endpoint);
    println!(
        "Language:          {}",
        config.speechkit.lang.as_deref().unwrap_or("(service default)")
    );
    println!("Max segment:       {}s", config.audio.max_segment_secs);
    println!("Max voice message: {}s", config.audio.max_voice_secs);
    println!("Work directory:    {}", config.audio.work_dir.display());
    println!("Log level:         {}", config.logging.level);
    println!("\nUse --show-secrets to display tokens");

    Ok(())
}

/// Log management
pub(crate) fn cmd_logs(operation: LogCommands) -> Result<()> {
    let log_dir = logging::default_log_dir();

    match operation {
        LogCommands::Status => {
            println!("Log directory: {}", log_dir.display());
            if log_dir.exists() {
                let count = std::fs::read_dir(&log_dir)?.count();
                println!("Log files: {}", count);
            } else {
                println!("No logs found. Run with -d to write log files.");
            }
            Ok(())
        }
        LogCommands::Clean { days } => {
            let removed = logging::cleanup_old_logs(&log_dir, days)
                .with_context(|| format!("Failed to clean {}", log_dir.display()))?;
            println!("Removed {} log file(s) older than {} day(s)", removed, days);
            Ok(())
        }
    }
}
