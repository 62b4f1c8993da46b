//! External transcoding collaborator.
//!
//! [`FfmpegTranscoder`] shells out to `ffprobe` for the source duration and to
//! `ffmpeg` once per segment.

use super::SegmentSpan;
use crate::config::AudioConfig;
use crate::error::RelayError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Status {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected output: {0}")]
    InvalidOutput(String),
}

/// Probes and re-encodes audio files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Total duration of the decodable stream at `source`.
    async fn probe_duration(&self, source: &Path) -> Result<Duration, TranscodeError>;

    /// Encode `span` of `source` into `output` (Ogg/Opus).
    async fn encode(
        &self,
        source: &Path,
        span: &SegmentSpan,
        output: &Path,
    ) -> Result<(), TranscodeError>;
}

pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf) -> Self {
        Self { ffmpeg, ffprobe }
    }

    /// Use the configured binaries, falling back to a PATH lookup.
    pub fn from_config(config: &AudioConfig) -> Result<Self, RelayError> {
        let ffmpeg = match &config.ffmpeg_path {
            Some(path) => path.clone(),
            None => which::which("ffmpeg").map_err(|_| RelayError::ConfigurationMissing("ffmpeg"))?,
        };
        let ffprobe = match &config.ffprobe_path {
            Some(path) => path.clone(),
            None => {
                which::which("ffprobe").map_err(|_| RelayError::ConfigurationMissing("ffprobe"))?
            }
        };

        tracing::debug!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Transcoder binaries resolved");
        Ok(Self::new(ffmpeg, ffprobe))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe_duration(&self, source: &Path) -> Result<Duration, TranscodeError> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(source);

        let output = run(&self.ffprobe, cmd).await?;
        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn encode(
        &self,
        source: &Path,
        span: &SegmentSpan,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-v", "error"])
            .arg("-ss")
            .arg(seconds_arg(span.start))
            .arg("-t")
            .arg(seconds_arg(span.duration))
            .arg("-i")
            .arg(source)
            .args(["-vn", "-ac", "1", "-c:a", "libopus"])
            .arg(output);

        run(&self.ffmpeg, cmd).await?;

        tracing::debug!(
            chunk = span.index,
            start = span.start.as_secs_f64(),
            duration = span.duration.as_secs_f64(),
            "Encoded segment"
        );
        Ok(())
    }
}

async fn run(program: &Path, mut cmd: Command) -> Result<Output, TranscodeError> {
    let program = program.display().to_string();
    let output = cmd
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| TranscodeError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(TranscodeError::Status {
            program,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

fn seconds_arg(value: Duration) -> String {
    format!("{:.3}", value.as_secs_f64())
}

fn parse_probe_output(stdout: &str) -> Result<Duration, TranscodeError> {
    let raw = stdout.trim();
    let secs: f64 = raw
        .parse()
        .map_err(|_| TranscodeError::InvalidOutput(format!("duration {:?}", raw)))?;

    Duration::try_from_secs_f64(secs)
        .map_err(|_| TranscodeError::InvalidOutput(format!("duration {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        assert_eq!(
            parse_probe_output("20.040000\n").unwrap(),
            Duration::from_millis(20_040)
        );
        assert_eq!(parse_probe_output("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_probe_output_rejects_garbage() {
        assert!(matches!(
            parse_probe_output("N/A"),
            Err(TranscodeError::InvalidOutput(_))
        ));
        assert!(parse_probe_output("-3.0").is_err());
        assert!(parse_probe_output("").is_err());
    }

    #[test]
    fn test_seconds_arg() {
        assert_eq!(seconds_arg(Duration::from_secs(14)), "14.000");
        assert_eq!(seconds_arg(Duration::from_millis(6_500)), "6.500");
    }

    #[test]
    fn test_configured_paths_skip_lookup() {
        let config = AudioConfig {
            ffmpeg_path: Some(PathBuf::from("/opt/ff/ffmpeg")),
            ffprobe_path: Some(PathBuf::from("/opt/ff/ffprobe")),
            ..AudioConfig::default()
        };
        let transcoder = FfmpegTranscoder::from_config(&config).unwrap();
        assert_eq!(transcoder.ffmpeg, PathBuf::from("/opt/ff/ffmpeg"));
        assert_eq!(transcoder.ffprobe, PathBuf::from("/opt/ff/ffprobe"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let transcoder = FfmpegTranscoder::new(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        );
        let err = transcoder
            .probe_duration(Path::new("voice.oga"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn { .. }));
    }
}
