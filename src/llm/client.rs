use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Text-completion capability consumed by the pipeline.
///
/// The pipeline only ever needs this one operation; keeping it behind a
/// trait lets tests drive the whole pipeline with a scripted fake instead
/// of a live API.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, AnalysisError>;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, AnalysisError> {
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| AnalysisError::MissingApiKey)?;

        Ok(Self {
            api_key,
            model: "claude-sonnet-4-5-20250929".to_string(),
            temperature: 0.2,
        })
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.2,
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Completion for AnthropicClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, AnalysisError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Upstream(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream(format!(
                "Anthropic API error: {} - {}",
                status, body
            )));
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Upstream(format!("malformed API response: {}", e)))?;

        // Concatenate all text blocks; long responses may be split
        let mut text = String::new();
        for block in &response.content {
            if block.content_type == "text" {
                text.push_str(&block.text);
            }
        }

        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
