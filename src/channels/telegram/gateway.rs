//! Telegram implementation of the relay's message gateway.

use super::TELEGRAM_FILE_URL;
use crate::error::RelayError;
use crate::relay::MessageGateway;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;

pub struct TelegramGateway {
    bot: Bot,
    token: String,
    http: reqwest::Client,
}

impl TelegramGateway {
    pub fn new(bot: Bot, token: String) -> Self {
        Self {
            bot,
            token,
            http: reqwest::Client::new(),
        }
    }

    fn download_url(&self, file_path: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_FILE_URL, self.token, file_path)
    }
}

#[async_trait]
impl MessageGateway for TelegramGateway {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .with_context(|| format!("Failed to send Telegram message to chat {}", chat_id))?;
        Ok(())
    }

    async fn download(&self, file_id: &str, dest: &Path) -> Result<(), RelayError> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| RelayError::Download(format!("get_file: {}", e)))?;

        let response = self
            .http
            .get(self.download_url(&file.path))
            .send()
            .await
            .map_err(|e| RelayError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Download(format!("Telegram file server returned {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::Download(e.to_string()))?;
        tokio::fs::write(dest, &bytes).await?;

        tracing::debug!(bytes = bytes.len(), path = %dest.display(), "Telegram: voice file downloaded");
        Ok(())
    }
}
