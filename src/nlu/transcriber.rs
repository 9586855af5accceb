use actix_web::web::Bytes;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Speech to text; the result is trimmed and never empty.
    async fn transcribe(&self, audio: Bytes, content_type: &str) -> Result<String, AppError>;
}

/// Posts raw audio to a speech-to-text service answering `{"text": "..."}`.
pub struct HttpTranscriber {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl HttpTranscriber {
    pub fn new(url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: Bytes, content_type: &str) -> Result<String, AppError> {
        if audio.is_empty() {
            return Err(AppError::Transcription("empty audio".into()));
        }

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!(error = %e, "Transcription request failed");
                AppError::Transcription(e.to_string())
            })?;

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transcription(format!("unreadable transcription: {e}")))?;

        let text = parsed.text.trim();
        if text.is_empty() {
            return Err(AppError::Transcription("no speech recognised".into()));
        }
        Ok(text.to_string())
    }
}
