//! Telegram Message Handler
//!
//! Answers `/start`, forwards voice notes to the relay, ignores the rest.

use crate::relay::VoiceMessage;
use teloxide::prelude::*;
use tokio::sync::mpsc;

pub(crate) const START_REPLY: &str =
    "Send me a voice message and I will reply with its transcript.";

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    events: mpsc::Sender<VoiceMessage>,
) -> ResponseResult<()> {
    if let Some(text) = msg.text()
        && text.starts_with("/start")
    {
        bot.send_message(msg.chat.id, START_REPLY).await?;
        tracing::info!("Telegram: /start in chat {}", msg.chat.id);
        return Ok(());
    }

    let Some(voice) = msg.voice() else {
        return Ok(());
    };

    let event = VoiceMessage {
        chat_id: msg.chat.id.0,
        file_id: voice.file.id.to_string(),
        duration_secs: voice.duration.seconds(),
    };

    tracing::info!(
        "Telegram: voice note in chat {} ({}s)",
        event.chat_id,
        event.duration_secs
    );

    if events.send(event).await.is_err() {
        tracing::warn!("Telegram: relay is shutting down, dropping voice note");
    }

    Ok(())
}
