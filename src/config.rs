use anyhow::{Context, bail};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    // Collaborators
    pub nlu_url: String,
    pub stt_url: Option<String>,
    pub hr_api_path: String,

    // Timeouts
    pub backend_timeout: Duration,
    pub submit_timeout: Duration,
    pub nlu_timeout: Duration,
    pub stt_timeout: Duration,

    // Drafts
    pub draft_idle_ttl: Duration,
    pub draft_max_capacity: u64,
    pub allow_anonymous_drafts: bool,

    // Rate limiting
    pub rate_assistant_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let parsed = |key: &str, default: &str| -> anyhow::Result<u64> {
            let raw = text(key, default);
            raw.parse().with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
        };
        let secs = |key: &str, default: &str| parsed(key, default).map(Duration::from_secs);

        let log_level = text("LOG_LEVEL", "debug");

        Ok(Self {
            server_addr: text("SERVER_ADDR", "127.0.0.1:8080"),
            api_prefix: text("API_PREFIX", "/api/v1"),

            nlu_url: text("NLU_URL", "http://localhost:5005"),
            stt_url: lookup("STT_URL").map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
            hr_api_path: text("HR_API_PATH", "/api/AjaxAPI"),

            backend_timeout: secs("BACKEND_TIMEOUT_SECS", "15")?,
            submit_timeout: secs("SUBMIT_TIMEOUT_SECS", "30")?,
            nlu_timeout: secs("NLU_TIMEOUT_SECS", "10")?,
            stt_timeout: secs("STT_TIMEOUT_SECS", "120")?,

            draft_idle_ttl: secs("DRAFT_IDLE_TTL_SECS", "1800")?,
            draft_max_capacity: parsed("DRAFT_MAX_CAPACITY", "100000")?,
            allow_anonymous_drafts: parse_flag("ALLOW_ANONYMOUS_DRAFTS", &text("ALLOW_ANONYMOUS_DRAFTS", "false"))?,

            rate_assistant_per_min: text("RATE_ASSISTANT_PER_MIN", "120")
                .parse()
                .context("RATE_ASSISTANT_PER_MIN must be an integer")?,

            log_dir: text("LOG_DIR", "logs"),
            log_level: tracing::Level::from_str(&log_level)
                .with_context(|| format!("LOG_LEVEL {log_level:?} is not a tracing level"))?,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be a boolean, got {raw:?}"),
    }
}
