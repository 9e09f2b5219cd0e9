use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to an oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// One oracle reply: the raw text plus the token usage it reported.
#[derive(Debug, Clone)]
pub struct OracleReply {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Black-box text-in/text-out collaborator behind the scoring and judge
/// stages. The seam exists so tests can script replies and failures without
/// a network.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<OracleReply, OracleError>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic Messages API client.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    version: String,
    client: Client,
}

impl AnthropicClient {
    pub fn new(base_url: String, api_key: String, version: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            version,
            client,
        }
    }
}

#[async_trait]
impl Oracle for AnthropicClient {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<OracleReply, OracleError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let payload = MessagesRequest {
            model,
            max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: user,
            }],
        };

        tracing::debug!(model, max_tokens, "Calling oracle");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.version)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;

        let text = json
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| OracleError::InvalidResponse("Missing content text".into()))?
            .trim()
            .to_string();

        let input_tokens = json
            .pointer("/usage/input_tokens")
            .and_then(|t| t.as_u64())
            .unwrap_or(0);
        let output_tokens = json
            .pointer("/usage/output_tokens")
            .and_then(|t| t.as_u64())
            .unwrap_or(0);

        Ok(OracleReply {
            text,
            input_tokens,
            output_tokens,
        })
    }
}

/// Extract the first bracketed JSON array substring from oracle text.
///
/// Oracles are asked for strict JSON but sometimes wrap it in commentary;
/// the slice from the first '[' to the last ']' is what gets parsed.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Extract the first braced JSON object substring from oracle text.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
