//! Yandex SpeechKit STT v1 client.
//!
//! One synchronous-recognition `POST` per chunk: raw Ogg/Opus bytes in the
//! body, bearer IAM token, and the cloud folder as a query parameter.

use super::{TranscriptionClient, TranscriptionResult};
use crate::audio::AudioChunk;
use crate::config::{SpeechKitConfig, SpeechKitCredentials};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub struct SpeechKitClient {
    client: Client,
    endpoint: String,
    iam_token: String,
    folder_id: String,
    lang: Option<String>,
}

impl SpeechKitClient {
    pub fn new(
        endpoint: impl Into<String>,
        credentials: SpeechKitCredentials,
        lang: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build SpeechKit HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            iam_token: credentials.iam_token,
            folder_id: credentials.folder_id,
            lang,
        })
    }

    pub fn from_config(config: &SpeechKitConfig, credentials: SpeechKitCredentials) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            credentials,
            config.lang.clone(),
            config.request_timeout(),
        )
    }

    /// Recognize raw Ogg/Opus bytes.
    pub async fn recognize(&self, audio: Vec<u8>) -> TranscriptionResult {
        let mut query = vec![("folderId", self.folder_id.as_str())];
        if let Some(lang) = &self.lang {
            query.push(("lang", lang.as_str()));
        }

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.iam_token)
            .header("Content-Type", "audio/ogg")
            .query(&query)
            .body(audio)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("SpeechKit request failed: {}", e);
                return TranscriptionResult::Error(format!("SpeechKit request failed: {}", e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return TranscriptionResult::Error(format!(
                    "Failed to read SpeechKit response ({}): {}",
                    status, e
                ));
            }
        };

        interpret_response(status, &body)
    }
}

#[async_trait]
impl TranscriptionClient for SpeechKitClient {
    async fn transcribe(&self, chunk: &AudioChunk) -> TranscriptionResult {
        let audio = match chunk.read().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return TranscriptionResult::Error(format!(
                    "Failed to read chunk {}: {}",
                    chunk.index(),
                    e
                ));
            }
        };

        let result = self.recognize(audio).await;
        match &result {
            TranscriptionResult::Text(text) => {
                tracing::info!(chunk = chunk.index(), "SpeechKit: transcribed {} chars", text.len());
            }
            TranscriptionResult::Error(message) => {
                tracing::warn!(chunk = chunk.index(), "SpeechKit error: {}", message);
            }
        }
        result
    }
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

fn interpret_response(status: reqwest::StatusCode, body: &str) -> TranscriptionResult {
    let parsed: RecognitionResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if status.is_success() => {
            return TranscriptionResult::Error(format!("Failed to parse SpeechKit response: {}", e));
        }
        Err(_) => {
            return TranscriptionResult::Error(format!("SpeechKit error ({}): {}", status, body.trim()));
        }
    };

    if let Some(message) = parsed.error_message {
        if message.is_empty() {
            let code = parsed.error_code.unwrap_or_else(|| status.to_string());
            return TranscriptionResult::Error(format!("SpeechKit error: {}", code));
        }
        return TranscriptionResult::Error(message);
    }

    if !status.is_success() {
        return TranscriptionResult::Error(format!("SpeechKit error ({}): {}", status, body.trim()));
    }

    TranscriptionResult::Text(stringify_result(parsed.result))
}

/// The `result` field as text: strings verbatim, null or missing as empty.
fn stringify_result(result: Option<Value>) -> String {
    match result {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}
