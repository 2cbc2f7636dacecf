//! OpenAI-compatible feedback provider.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bandscore_core::feedback::{build_prompt, parse_feedback};
use bandscore_core::model::SubjectiveTask;
use bandscore_core::results::FeedbackPayload;
use bandscore_core::traits::FeedbackProvider;
use bandscore_core::FeedbackError;

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Generation settings shared by every request a provider sends.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub model: String,
    pub temperature: f64,
    pub writing_max_tokens: u32,
    pub speaking_max_tokens: u32,
    /// Whole-request timeout; expiry counts as the provider being unavailable.
    pub timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            writing_max_tokens: 1500,
            speaking_max_tokens: 1200,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Feedback provider backed by an OpenAI-compatible chat completions API.
pub struct OpenAiFeedbackProvider {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl OpenAiFeedbackProvider {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
        settings: GatewaySettings,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            org_id,
            settings,
            client,
        })
    }

    fn max_tokens(&self, task: &SubjectiveTask) -> u32 {
        match task {
            SubjectiveTask::Writing(_) => self.settings.writing_max_tokens,
            SubjectiveTask::Speaking(_) => self.settings.speaking_max_tokens,
        }
    }

    /// Send one chat completion and return the assistant message text.
    async fn complete(&self, body: &ChatRequest) -> Result<String, FeedbackError> {
        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req.json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.settings.timeout.as_secs())
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                .saturating_mul(1000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(self.settings.model.clone()).into());
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.settings.timeout.as_secs())
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;
        let api_response: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            FeedbackError::MalformedProviderResponse(format!("unexpected completion body: {e}"))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                FeedbackError::MalformedProviderResponse("completion has no message content".into())
            })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl FeedbackProvider for OpenAiFeedbackProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, task), fields(model = %self.settings.model, skill = %task.skill()))]
    async fn assess(&self, task: &SubjectiveTask) -> Result<FeedbackPayload, FeedbackError> {
        let start = Instant::now();
        let prompt = build_prompt(task);

        let body = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.max_tokens(task),
        };

        let content = self.complete(&body).await?;
        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "feedback received"
        );

        parse_feedback(task, &content).inspect_err(|e| {
            tracing::warn!("unusable provider reply ({e}): {}", truncate(&content, 200));
        })
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
