use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ProviderAdapter;
use crate::app_config::{ProviderConfig, TranslationCommonConfig};
use crate::errors::ProviderError;

/// Anthropic messages API adapter
#[derive(Debug)]
pub struct AnthropicAdapter {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    role: String,

    /// Content of the message
    content: String,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    /// The content of the response
    content: Vec<AnthropicContent>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    content_type: String,

    /// The actual text content
    text: String,
}

impl AnthropicAdapter {
    /// Create a new Anthropic adapter from provider configuration
    pub fn new(config: &ProviderConfig, common: &TranslationCommonConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: common.temperature,
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    async fn complete(&self, request: AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let response = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthenticationError(error_text),
                429 => ProviderError::RateLimitExceeded(error_text),
                code => ProviderError::ApiError {
                    status_code: code,
                    message: error_text,
                },
            });
        }

        response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn initialize(&self) -> Result<(), ProviderError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: None,
            max_tokens: 10,
        };

        self.complete(request).await?;
        Ok(())
    }

    async fn call(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(self.temperature),
            max_tokens: 8192,
        };

        let response = self.complete(request).await?;

        Ok(response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::TranslationProvider;

    fn adapter() -> AnthropicAdapter {
        let mut config = ProviderConfig::new(TranslationProvider::Anthropic);
        config.api_key = "test-key".to_string();
        AnthropicAdapter::new(&config, &TranslationCommonConfig::default())
    }

    #[test]
    fn test_apiUrl_withoutEndpoint_shouldUsePublicApi() {
        let a = adapter();
        assert_eq!(a.api_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_apiUrl_withEndpoint_shouldTrimTrailingSlash() {
        let mut config = ProviderConfig::new(TranslationProvider::Anthropic);
        config.endpoint = "http://localhost:8080/".to_string();
        let a = AnthropicAdapter::new(&config, &TranslationCommonConfig::default());
        assert_eq!(a.api_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_requestSerialization_shouldOmitMissingTemperature() {
        let request = AnthropicRequest {
            model: "m".to_string(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: 10,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("temperature"));
    }
}
