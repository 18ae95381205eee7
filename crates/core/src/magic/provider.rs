//! Text-generation providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::error::MagicError;

/// Request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a prompt.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, MagicError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

fn build_client() -> Result<HttpClient, MagicError> {
    HttpClient::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| MagicError::Configuration(e.to_string()))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

/// Anthropic-backed generator.
pub struct AnthropicGenerator {
    client: HttpClient,
    api_key: String,
    model: String,
}

impl AnthropicGenerator {
    /// Creates a generator for the given key and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, MagicError> {
        Ok(Self {
            client: build_client()?,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, MagicError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| MagicError::provider(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MagicError::provider(error_text));
        }

        let result: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| MagicError::provider(e.to_string()))?;

        Ok(result
            .content
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// ---------------------------------------------------------------------------
// OpenAI Chat Completions API
// ---------------------------------------------------------------------------

/// OpenAI-backed generator.
pub struct OpenAiGenerator {
    client: HttpClient,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    /// Creates a generator for the given key and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, MagicError> {
        Ok(Self {
            client: build_client()?,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, MagicError> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            temperature: 0.7,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| MagicError::provider(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MagicError::provider(error_text));
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| MagicError::provider(e.to_string()))?;

        Ok(result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
