use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ProviderAdapter;
use crate::app_config::{ProviderConfig, TranslationCommonConfig};
use crate::errors::ProviderError;

/// Adapter for a local Ollama server
#[derive(Debug)]
pub struct OllamaAdapter {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the server (e.g. "http://localhost:11434")
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// Generation request
#[derive(Debug, Serialize)]
struct GenerateRequest {
    /// The model to use
    model: String,

    /// The prompt to complete
    prompt: String,

    /// Whether to stream the response
    stream: bool,

    /// Generation options
    options: GenerateOptions,
}

/// Generation options
#[derive(Debug, Serialize)]
struct GenerateOptions {
    /// Temperature for generation
    temperature: f32,
}

/// Generation response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    /// The generated text
    response: String,
}

impl OllamaAdapter {
    /// Create a new adapter from provider configuration
    pub fn new(config: &ProviderConfig, common: &TranslationCommonConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: common.temperature,
        }
    }

    fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn initialize(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.base_url());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ConnectionError(format!(
                "Ollama server at {} responded with status {}",
                self.endpoint,
                response.status()
            )));
        }

        Ok(())
    }

    async fn call(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url());

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
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
            error!("Ollama API error ({}): {}", status, error_text);

            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let generated = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(generated.response)
    }
}
