/*!
 * Unit tests for configuration loading, overriding and validation
 */

use std::str::FromStr;

use modloc::app_config::{Config, GlossaryMode, TranslationProvider};

fn minimal_config_json() -> &'static str {
    r#"{
        "source_language": "en",
        "target_languages": ["pl", "zh-CN"],
        "translation": {
            "provider": "ollama"
        }
    }"#
}

#[test]
fn test_deserialize_withMinimalJson_shouldFillDefaults() {
    let config: Config = serde_json::from_str(minimal_config_json()).unwrap();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages, vec!["pl", "zh-CN"]);
    assert_eq!(config.game, "stellaris");
    assert_eq!(config.glossary.mode, GlossaryMode::Loose);
    assert!(config.glossary.path.is_none());
    assert_eq!(config.translation.common.max_retries, 2);
    assert_eq!(config.translation.common.retry_backoff_secs, 2);
}

#[test]
fn test_deserialize_thenValidate_withOllamaDefaults_shouldPass() {
    let config: Config = serde_json::from_str(minimal_config_json()).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withApiProviderAndNoKey_shouldFail() {
    let mut config: Config = serde_json::from_str(minimal_config_json()).unwrap();
    config.translation.provider = TranslationProvider::Anthropic;

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("API key"));
}

#[test]
fn test_validate_withTargetEqualToSource_shouldFail() {
    let mut config: Config = serde_json::from_str(minimal_config_json()).unwrap();
    config.target_languages = vec!["EN".to_string()];

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withNoTargets_shouldFail() {
    let mut config: Config = serde_json::from_str(minimal_config_json()).unwrap();
    config.target_languages.clear();

    assert!(config.validate().is_err());
}

#[test]
fn test_providerFromStr_shouldAcceptCliAlias() {
    assert_eq!(
        TranslationProvider::from_str("cli").unwrap(),
        TranslationProvider::CliTool
    );
    assert_eq!(
        TranslationProvider::from_str("OpenAI").unwrap(),
        TranslationProvider::OpenAI
    );
    assert!(TranslationProvider::from_str("bard").is_err());
}

#[test]
fn test_effectiveChunkSize_shouldFollowActiveProvider() {
    let mut config: Config = serde_json::from_str(minimal_config_json()).unwrap();

    assert_eq!(config.translation.effective_chunk_size(), 20);

    config.translation.provider = TranslationProvider::CliTool;
    assert_eq!(config.translation.effective_chunk_size(), 100);

    config.translation.provider = TranslationProvider::OpenAI;
    assert_eq!(config.translation.effective_chunk_size(), 40);
}

#[test]
fn test_serializeRoundTrip_shouldPreserveProvider() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;

    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.translation.provider, TranslationProvider::Anthropic);
}
