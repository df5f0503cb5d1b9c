//! HTTP client for the external classification capability.
//!
//! Speaks an OpenAI-style chat-completions protocol. Configuration is
//! loaded from environment variables; if `CLASSIFIER_URL` is not set,
//! [`ClassifierConfig::from_env`] returns `None` and the worker should
//! fall back to [`FallbackTriage`](crate::FallbackTriage).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::extract::parse_response;
use crate::{Triage, TriageResult};

/// Default model name sent to the capability.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default per-call timeout. A timeout is a soft failure, not an error.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

const SYSTEM_PROMPT: &str = "You are an expert assistant that triages technical \
support tickets. Summarize the issue, estimate its priority, provide helpful notes \
for human moderators, and list the technical skills required. Respond with ONLY a \
valid JSON object, no markdown and no explanations, in exactly this format:\n\
{\"summary\": \"Brief summary\", \"priority\": \"low|medium|high\", \
\"notes\": \"Technical explanation\", \"skills\": [\"skill1\", \"skill2\"]}";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single classification attempt.
///
/// Never escapes the adapter: every variant resolves to the fallback.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The HTTP request failed (network, DNS, non-2xx status).
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The call exceeded the configured timeout.
    #[error("Classifier call timed out after {0:?}")]
    Timeout(Duration),

    /// The response envelope had no message content.
    #[error("Classifier response had no content")]
    EmptyResponse,
}

// ---------------------------------------------------------------------------
// ClassifierConfig
// ---------------------------------------------------------------------------

/// Configuration for the classification capability.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Chat-completions endpoint URL.
    pub url: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Model name to request.
    pub model: String,
    /// Upper bound on a single classification call.
    pub timeout: Duration,
}

impl ClassifierConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `CLASSIFIER_URL` is not set, signalling that
    /// classification is not configured.
    ///
    /// | Variable                  | Required | Default       |
    /// |---------------------------|----------|---------------|
    /// | `CLASSIFIER_URL`          | yes      | —             |
    /// | `CLASSIFIER_API_KEY`      | no       | —             |
    /// | `CLASSIFIER_MODEL`        | no       | `gpt-4o-mini` |
    /// | `CLASSIFIER_TIMEOUT_SECS` | no       | `20`          |
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("CLASSIFIER_URL").ok()?;
        Some(Self {
            url,
            api_key: std::env::var("CLASSIFIER_API_KEY").ok(),
            model: std::env::var("CLASSIFIER_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("CLASSIFIER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// ClassifierClient
// ---------------------------------------------------------------------------

/// Classifies ticket text via the configured chat-completions endpoint.
pub struct ClassifierClient {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl ClassifierClient {
    /// Create a new client with a pre-configured HTTP client.
    pub fn new(config: ClassifierConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Execute one chat-completions request and return the raw reply text.
    async fn request_completion(&self, ticket_text: &str) -> Result<String, ClassifyError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!(
                    "Analyze this support ticket and respond with ONLY a JSON object:\n\n{ticket_text}"
                ) },
            ],
        });

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?.error_for_status()?;
        let envelope: serde_json::Value = response.json().await?;

        envelope["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(ClassifyError::EmptyResponse)
    }
}

#[async_trait]
impl Triage for ClassifierClient {
    /// Classify ticket text, resolving every failure mode to the fallback.
    async fn classify(&self, ticket_text: &str) -> TriageResult {
        let attempt = tokio::time::timeout(
            self.config.timeout,
            self.request_completion(ticket_text),
        )
        .await;

        let raw = match attempt {
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Classifier call timed out, using fallback triage"
                );
                return TriageResult::fallback();
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Classifier call failed, using fallback triage");
                return TriageResult::fallback();
            }
            Ok(Ok(raw)) => raw,
        };

        match parse_response(&raw) {
            Some(result) => result,
            None => {
                tracing::warn!(
                    reply_len = raw.len(),
                    "Classifier reply was unusable, using fallback triage"
                );
                TriageResult::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_url() {
        std::env::remove_var("CLASSIFIER_URL");
        assert!(ClassifierConfig::from_env().is_none());
    }

    #[test]
    fn classify_error_display_timeout() {
        let err = ClassifyError::Timeout(Duration::from_secs(20));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_resolves_to_fallback() {
        // Port 9 (discard) with a tight timeout: the request cannot succeed.
        let client = ClassifierClient::new(ClassifierConfig {
            url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_millis(250),
        })
        .unwrap();

        let result = client.classify("the widget is broken").await;
        assert_eq!(result, TriageResult::fallback());
    }
}
