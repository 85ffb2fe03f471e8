/*!
 * Tests for application configuration functionality
 */

use cuesmith::app_config::{Config, LogLevel, TranslateMode, TranslationProvider};
use cuesmith::formats::{Layout, OutputFormat};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_language, "zh-hans");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.mode, TranslateMode::Precise);
    assert_eq!(config.translation.batch_size, 40);
    assert_eq!(config.translation.context_overlap, 2);
    assert_eq!(config.translation.max_rounds, 40);
    assert_eq!(config.translation.rechunk_size, 4);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434/v1");
    assert_eq!(config.segmentation.max_gap_ms, 1500);
    assert_eq!(config.output.formats, vec![OutputFormat::Srt]);
    assert_eq!(config.output.layout, Layout::OriginalOnTop);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = common::test_config();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    // OpenAI needs a key, but only when translating
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.active_provider_config_mut().api_key = String::new();
    assert!(config.validate().is_err());
    config.translation.need_translate = false;
    assert!(config.validate().is_ok());
    config.translation.need_translate = true;
    config.translation.active_provider_config_mut().api_key = "sk-1234567890".to_string();
    assert!(config.validate().is_ok());

    config.translation.context_overlap = config.translation.batch_size;
    assert!(config.validate().is_err());
    config.translation.context_overlap = 2;

    config.translation.max_rounds = 0;
    assert!(config.validate().is_err());
    config.translation.max_rounds = 40;

    config.output.formats.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.target_language, created.target_language);
    assert_eq!(reloaded.translation.get_model(), created.translation.get_model());
    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "source_language": "ja",
            "target_language": "en",
            "translation": {
                "mode": "deep_thought",
                "provider": "lmstudio",
                "available_providers": [{"type": "lmstudio", "model": "qwen"}]
            },
            "output": {"layout": "translated-on-top", "formats": ["srt", "ass"]}
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.translation.mode, TranslateMode::Deep);
    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.get_model(), "qwen");
    // empty endpoint falls back to the provider default
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
    assert_eq!(config.translation.batch_size, 40);
    assert_eq!(config.output.layout, Layout::TranslatedOnTop);
    assert_eq!(config.output.formats, vec![OutputFormat::Srt, OutputFormat::Ass]);
    assert_eq!(config.segmentation.max_words_latin, 10);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_provider_from_str_shouldBeCaseInsensitive() {
    assert_eq!("OpenAI".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("lmstudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert!("anthropic".parse::<TranslationProvider>().is_err());
}

#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.active_provider_config_mut().model = "llama3".to_string();
    assert_eq!(config.translation.get_model(), "llama3");
    assert_eq!(config.translation.available_providers.len(), 1);
}
