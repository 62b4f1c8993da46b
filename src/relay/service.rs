//! Voice relay service
//!
//! Turns each inbound voice message into exactly one outbound text reply.

use super::coordinator::AggregateReply;
use super::pipeline::VoicePipeline;
use crate::error::RelayError;
use crate::utils::{fit_chars, preview};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const EMPTY_AUDIO_NOTICE: &str = "The voice message is empty.";
pub const FAILURE_NOTICE: &str = "Sorry, this voice message could not be processed.";
pub const NO_SPEECH_NOTICE: &str = "No speech was recognized in this voice message.";

/// Longest text Telegram accepts in one message.
pub const MAX_REPLY_CHARS: usize = 4096;

/// Fixed notice for messages above the configured duration limit.
pub fn too_long_notice(max_voice_secs: u64) -> String {
    format!(
        "Please send a voice message that is at most {} seconds long.",
        max_voice_secs
    )
}

/// An inbound voice message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMessage {
    pub chat_id: i64,
    pub file_id: String,
    pub duration_secs: u32,
}

/// The messaging platform, seen from the relay.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Send a plain-text message to `chat_id`.
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    /// Fetch the remote file `file_id` into `dest`.
    async fn download(&self, file_id: &str, dest: &Path) -> Result<(), RelayError>;
}

pub struct VoiceRelay {
    pipeline: VoicePipeline,
    gateway: Arc<dyn MessageGateway>,
    max_voice_secs: u64,
    work_dir: PathBuf,
}

impl VoiceRelay {
    pub fn new(
        pipeline: VoicePipeline,
        gateway: Arc<dyn MessageGateway>,
        max_voice_secs: u64,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            pipeline,
            gateway,
            max_voice_secs,
            work_dir,
        }
    }

    /// Handle one voice message and send its single reply.
    ///
    /// A reply the gateway rejects is replaced by `FAILURE_NOTICE`, sent once.
    pub async fn handle_voice(&self, message: VoiceMessage) -> anyhow::Result<()> {
        tracing::info!(
            chat_id = message.chat_id,
            duration = message.duration_secs,
            "Voice message received"
        );

        let reply = self.reply_for(&message).await;
        let reply = fit_chars(&reply, MAX_REPLY_CHARS);

        if let Err(e) = self.gateway.send_text(message.chat_id, &reply).await {
            tracing::warn!(
                chat_id = message.chat_id,
                "Reply rejected, sending failure notice instead: {}",
                e
            );
            self.gateway.send_text(message.chat_id, FAILURE_NOTICE).await?;
            return Ok(());
        }

        tracing::info!(chat_id = message.chat_id, "Replied: {}", preview(&reply, 80));
        Ok(())
    }

    async fn reply_for(&self, message: &VoiceMessage) -> String {
        if message.duration_secs == 0 {
            return EMPTY_AUDIO_NOTICE.to_string();
        }

        if u64::from(message.duration_secs) > self.max_voice_secs {
            tracing::info!(
                chat_id = message.chat_id,
                duration = message.duration_secs,
                limit = self.max_voice_secs,
                "Voice message too long, not transcribing"
            );
            return too_long_notice(self.max_voice_secs);
        }

        let source = self.work_dir.join(format!("voice_{}.oga", Uuid::new_v4()));
        let outcome = self.transcribe_source(message, &source).await;

        if let Err(e) = tokio::fs::remove_file(&source).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %source.display(), "Failed to delete voice file: {}", e);
        }

        match outcome {
            Ok(reply) if reply.text().trim().is_empty() => {
                if reply.is_failure() {
                    FAILURE_NOTICE.to_string()
                } else {
                    NO_SPEECH_NOTICE.to_string()
                }
            }
            Ok(reply) => reply.text().to_string(),
            Err(RelayError::EmptyAudio) => EMPTY_AUDIO_NOTICE.to_string(),
            Err(e) => {
                tracing::error!(
                    chat_id = message.chat_id,
                    code = %e.code(),
                    "Voice message failed: {}",
                    e
                );
                FAILURE_NOTICE.to_string()
            }
        }
    }

    async fn transcribe_source(
        &self,
        message: &VoiceMessage,
        source: &Path,
    ) -> Result<AggregateReply, RelayError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        self.gateway.download(&message.file_id, source).await?;
        self.pipeline.run(source).await
    }

    /// Consume voice messages until the channel closes or `cancel` fires.
    ///
    /// Each message is handled on its own task. In-flight messages are always
    /// finished before this returns.
    pub async fn listen(
        self: Arc<Self>,
        mut events: mpsc::Receiver<VoiceMessage>,
        cancel: CancellationToken,
    ) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Voice relay cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(message) => {
                        let relay = self.clone();
                        in_flight.spawn(async move {
                            let chat_id = message.chat_id;
                            if let Err(e) = relay.handle_voice(message).await {
                                tracing::error!(chat_id, "Failed to send reply: {}", e);
                            }
                        });
                    }
                    None => {
                        tracing::info!("Voice event channel closed");
                        break;
                    }
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Voice message task failed: {}", e);
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            tracing::info!("Waiting for {} in-flight voice message(s)", in_flight.len());
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Voice message task failed: {}", e);
            }
        }
    }
}
