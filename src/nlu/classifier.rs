use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::error::AppError;
use crate::model::intent::IntentResult;

pub const FALLBACK_INTENT: &str = "nlu_fallback";

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentResult, AppError>;
}

/// Rasa HTTP API: `POST {base}/model/parse`.
pub struct RasaClassifier {
    client: reqwest::Client,
    parse_url: String,
}

#[derive(Deserialize)]
struct ParseResponse {
    intent: Option<IntentResult>,
}

impl RasaClassifier {
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            parse_url: format!("{}/model/parse", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IntentClassifier for RasaClassifier {
    async fn classify(&self, text: &str) -> Result<IntentResult, AppError> {
        let response = self
            .client
            .post(&self.parse_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!(error = %e, "Intent classification failed");
                AppError::Classifier(e.to_string())
            })?;

        let parsed: ParseResponse = response
            .json()
            .await
            .map_err(|e| AppError::Classifier(format!("unreadable classifier response: {e}")))?;

        Ok(parsed
            .intent
            .filter(|intent| !intent.name.trim().is_empty())
            .unwrap_or_else(|| IntentResult {
                name: FALLBACK_INTENT.to_string(),
                confidence: 0.0,
            }))
    }
}
