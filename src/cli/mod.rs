//! CLI Module
//!
//! Command-line interface for voxrelay using Clap v4.

mod commands;

pub use commands::load_config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// voxrelay - transcribe Telegram voice messages with Yandex SpeechKit
#[derive(Parser, Debug)]
#[command(name = "voxrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (creates log files in .voxrelay/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Telegram bot (default)
    Run,

    /// Transcribe a local audio file and print the result
    Transcribe {
        /// Audio file to transcribe
        file: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration
    Config {
        /// Show full configuration including secrets
        #[arg(short, long)]
        show_secrets: bool,
    },

    /// Log management operations
    Logs {
        #[command(subcommand)]
        operation: LogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show log directory and file count
    Status,
    /// Clean up old log files
    Clean {
        /// Maximum age in days (default: 7)
        #[arg(short = 'a', long, default_value = "7")]
        days: u64,
    },
}

/// Dispatch the parsed command against an already loaded configuration.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        None | Some(Commands::Run) => commands::cmd_run(&config).await,
        Some(Commands::Transcribe { file }) => commands::cmd_transcribe(&config, &file).await,
        Some(Commands::Init { force }) => commands::cmd_init(&config, force),
        Some(Commands::Config { show_secrets }) => commands::cmd_config(&config, show_secrets),
        Some(Commands::Logs { operation }) => commands::cmd_logs(operation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["voxrelay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_transcribe_parses_file() {
        let cli = Cli::try_parse_from(["voxrelay", "-d", "transcribe", "voice.oga"]).unwrap();
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Transcribe { file }) => assert_eq!(file, PathBuf::from("voice.oga")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["voxrelay", "run", "--config", "bot.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("bot.toml"));
        assert!(matches!(cli.command, Some(Commands::Run)));
    }

    #[test]
    fn test_logs_clean_default_days() {
        let cli = Cli::try_parse_from(["voxrelay", "logs", "clean"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Logs { operation: LogCommands::Clean { days: 7 } })
        ));
    }
}
