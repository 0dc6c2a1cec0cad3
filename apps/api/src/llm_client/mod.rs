//! LLM Client — the single point of entry for all generative API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Everything goes through the `GenerativeModel` trait, which `AppState`
//! carries as `Arc<dyn GenerativeModel>`.
//!
//! Model: gemini-2.0-flash (hardcoded — do not make configurable to prevent drift)

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// The model used for all generative calls.
pub const MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(e)
        }
    }
}

/// A text-in, text-out generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends `prompt` as a single user turn and returns the first text part
    /// of the first candidate (empty when the response carries none).
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        api_base: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, MODEL)
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    /// 429 and 5xx responses (and transport errors) are retried up to
    /// `max_retries` times with exponential backoff plus jitter.
    pub async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::from(e));
                    continue;
                }
            };

            let status = response.status();

            if status.is_success() {
                let parsed: GenerateContentResponse = response.json().await?;
                if let Some(usage) = &parsed.usage_metadata {
                    debug!(
                        "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                        usage.prompt_token_count, usage.candidates_token_count
                    );
                }
                return Ok(parsed);
            }

            let body = response.text().await.unwrap_or_default();
            let error = LlmError::Api {
                status: status.as_u16(),
                body,
            };

            if status.as_u16() == 429 || status.is_server_error() {
                warn!("Gemini API returned {}", status);
                last_error = Some(error);
                continue;
            }

            return Err(error);
        }

        Err(last_error.unwrap_or(LlmError::Timeout))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        Ok(response.text().unwrap_or_default().trim().to_string())
    }
}

/// 500ms, 1s, 2s, ... capped at 8s, plus up to 250ms of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base = 500u64 << (attempt - 1).min(4);
    let jitter = rand::thread_rng().gen_range(0..250);
    Duration::from_millis(base + jitter)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.trim();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
