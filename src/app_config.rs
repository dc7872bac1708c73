use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (e.g. "en")
    pub source_language: String,

    /// Target language codes (e.g. ["zh-CN", "pl"])
    pub target_languages: Vec<String>,

    /// Game profile identifier (e.g. "stellaris", "eu4")
    #[serde(default = "default_game_profile")]
    pub game: String,

    /// Short description of the mod, injected into every prompt
    #[serde(default = "String::new")]
    pub mod_context: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Glossary config
    #[serde(default)]
    pub glossary: GlossaryConfig,

    /// Path to the checkpoint database (defaults to the user data dir)
    #[serde(default)]
    pub checkpoint_db: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI-compatible chat completions API
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: External CLI binary driven over stdin/stdout
    CliTool,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::CliTool => "CLI tool",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::CliTool => "clitool".to_string(),
        }
    }

    /// Default batch size for this provider
    pub fn default_chunk_size(&self) -> usize {
        match self {
            // Local models choke on large numbered lists
            Self::Ollama => 20,
            // CLI tools amortize process startup over bigger batches
            Self::CliTool => 100,
            _ => 40,
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "clitool" | "cli" => Ok(Self::CliTool),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, or executable path for CLI providers
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Entries per translation batch
    #[serde(default)]
    pub chunk_size: Option<usize>,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                chunk_size: None,
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                chunk_size: None,
                timeout_secs: default_timeout_secs(),
                rate_limit: Some(60),
            },
            TranslationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: String::new(),
                concurrent_requests: default_concurrent_requests(),
                chunk_size: None,
                timeout_secs: default_timeout_secs(),
                rate_limit: Some(45),
            },
            TranslationProvider::CliTool => Self {
                provider_type: "clitool".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_cli_binary(),
                concurrent_requests: 1,
                chunk_size: None,
                timeout_secs: default_cli_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Translation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Active provider
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Configurations for all known providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Settings shared by all providers
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: default_available_providers(),
            common: TranslationCommonConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the configuration for the active provider
    pub fn active_provider_config(&self) -> Option<&ProviderConfig> {
        let wanted = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == wanted)
    }

    /// Effective batch size for the active provider
    pub fn effective_chunk_size(&self) -> usize {
        self.active_provider_config()
            .and_then(|p| p.chunk_size)
            .unwrap_or_else(|| self.provider.default_chunk_size())
    }
}

/// Settings shared by all translation providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Number of retries after the first failed attempt for a batch
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Seconds multiplied by the attempt number between retries
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Temperature passed to providers that accept one
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_secs: default_retry_backoff_secs(),
            temperature: default_temperature(),
        }
    }
}

/// Glossary matching mode
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GlossaryMode {
    /// All matching tiers enabled
    #[default]
    Loose,
    /// Fuzzy matching disabled
    Strict,
}

/// Glossary configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GlossaryConfig {
    /// Path to the glossary JSON file, if any
    #[serde(default)]
    pub path: Option<String>,

    /// Matching mode
    #[serde(default)]
    pub mode: GlossaryMode,
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty"));
        }

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }

        if self
            .target_languages
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&self.source_language))
        {
            return Err(anyhow!(
                "Target languages must differ from the source language"
            ));
        }

        let provider_config = self
            .translation
            .active_provider_config()
            .ok_or_else(|| {
                anyhow!(
                    "No configuration found for provider '{}'",
                    self.translation.provider
                )
            })?;

        match self.translation.provider {
            TranslationProvider::OpenAI | TranslationProvider::Anthropic => {
                if provider_config.api_key.trim().is_empty() {
                    return Err(anyhow!(
                        "API key is required for provider '{}'",
                        self.translation.provider
                    ));
                }
                if provider_config.model.trim().is_empty() {
                    return Err(anyhow!(
                        "Model is required for provider '{}'",
                        self.translation.provider
                    ));
                }
                // Anthropic's endpoint may be empty (public API default)
                if !provider_config.endpoint.trim().is_empty() {
                    validate_endpoint_url(&provider_config.endpoint)?;
                }
            }
            TranslationProvider::Ollama => {
                if provider_config.model.trim().is_empty() {
                    return Err(anyhow!("Model is required for provider 'ollama'"));
                }
                validate_endpoint_url(&provider_config.endpoint)?;
            }
            TranslationProvider::CliTool => {
                if provider_config.endpoint.trim().is_empty() {
                    return Err(anyhow!("Executable path is required for provider 'clitool'"));
                }
            }
        }

        Ok(())
    }
}

/// Check that an HTTP provider endpoint is a parseable http(s) URL
fn validate_endpoint_url(endpoint: &str) -> Result<()> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", endpoint, e))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "Endpoint '{}' must use the http or https scheme",
            endpoint
        ));
    }

    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_languages: vec!["zh-CN".to_string()],
            game: default_game_profile(),
            mod_context: String::new(),
            translation: TranslationConfig::default(),
            glossary: GlossaryConfig::default(),
            checkpoint_db: None,
            log_level: LogLevel::default(),
        }
    }
}

// Default value functions for serde

fn default_game_profile() -> String {
    "stellaris".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(TranslationProvider::Ollama),
        ProviderConfig::new(TranslationProvider::OpenAI),
        ProviderConfig::new(TranslationProvider::Anthropic),
        ProviderConfig::new(TranslationProvider::CliTool),
    ]
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_cli_timeout_secs() -> u64 {
    300
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_backoff_secs() -> u64 {
    2
}

fn default_temperature() -> f32 {
    0.3
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_cli_binary() -> String {
    "gemini".to_string()
}
