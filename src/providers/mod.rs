/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI-compatible chat completions API
 * - Anthropic: Anthropic API integration
 * - CLI: external command-line tool driven over stdin/stdout
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

use crate::app_config::{ProviderConfig, TranslationCommonConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common interface for all provider backends.
///
/// Adapters are constructed by [`create_adapter`] and used interchangeably
/// by the batch scheduler: one prompt in, one raw completion out. Retry
/// policy lives in the scheduler, not here.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
    /// Provider identifier, for logging
    fn name(&self) -> &str;

    /// Verify the backend is reachable and usable.
    ///
    /// Called once before any batch is dispatched.
    async fn initialize(&self) -> Result<(), ProviderError>;

    /// Send one prompt and return the raw completion text
    async fn call(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Whether multiple calls may be in flight at once.
    ///
    /// Serialized backends (subprocess CLIs) force the worker pool down
    /// to a single worker.
    fn supports_concurrency(&self) -> bool {
        true
    }
}

/// Build the adapter for a provider id.
///
/// The id is matched case-insensitively against the known provider set;
/// unknown ids are rejected rather than defaulted.
pub fn create_adapter(
    provider_id: &str,
    config: &ProviderConfig,
    common: &TranslationCommonConfig,
) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
    let provider = TranslationProvider::from_str(provider_id)
        .map_err(|_| ProviderError::UnknownProvider(provider_id.to_string()))?;

    let adapter: Arc<dyn ProviderAdapter> = match provider {
        TranslationProvider::Ollama => Arc::new(ollama::OllamaAdapter::new(config, common)),
        TranslationProvider::OpenAI => Arc::new(openai::OpenAIAdapter::new(config, common)),
        TranslationProvider::Anthropic => {
            Arc::new(anthropic::AnthropicAdapter::new(config, common))
        }
        TranslationProvider::CliTool => Arc::new(cli::CliAdapter::new(config)),
    };

    Ok(adapter)
}

pub mod anthropic;
pub mod cli;
pub mod ollama;
pub mod openai;
