//! Telegram Agent
//!
//! Dispatcher startup and shutdown.

use super::handler::handle_message;
use crate::relay::VoiceMessage;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Telegram bot that feeds voice notes into the relay channel
pub struct TelegramAgent {
    bot: Bot,
    events: mpsc::Sender<VoiceMessage>,
}

impl TelegramAgent {
    pub fn new(bot: Bot, events: mpsc::Sender<VoiceMessage>) -> Self {
        Self { bot, events }
    }

    /// Start the dispatcher as a background task. Cancelling `cancel` stops
    /// polling; the relay channel closes once the dispatcher is gone.
    pub fn start(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("Starting Telegram bot");

            match self.bot.get_me().await {
                Ok(me) => {
                    if let Some(ref username) = me.username {
                        tracing::info!("Telegram: bot username is @{}", username);
                    }
                }
                Err(e) => {
                    tracing::warn!("Telegram: failed to get bot info (get_me): {}", e);
                }
            }

            let events = self.events;
            let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let events = events.clone();
                async move { handle_message(bot, msg, events).await }
            });

            let mut dispatcher = Dispatcher::builder(self.bot, handler).build();

            let shutdown = dispatcher.shutdown_token();
            let watcher = tokio::spawn(async move {
                cancel.cancelled().await;
                match shutdown.shutdown() {
                    Ok(done) => done.await,
                    Err(e) => tracing::debug!("Telegram: dispatcher not running: {}", e),
                }
            });

            dispatcher.dispatch().await;
            watcher.abort();
            drop(dispatcher);

            tracing::info!("Telegram bot stopped");
        })
    }
}
