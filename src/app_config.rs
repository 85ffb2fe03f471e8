use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::formats::{AssStyleSheet, Layout, OutputFormat};
use crate::language_utils;

/// Application configuration module
/// This module handles loading, validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO or "auto")
    pub source_language: String,

    /// Target language code (ISO or regional variant such as "zh-hans")
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Segmentation of word-level input
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Output formats and layout
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama, through its OpenAI-compatible /v1 endpoint
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation strategy
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslateMode {
    /// Literal translation
    Fast,
    /// Idiomatic translation
    #[default]
    Precise,
    /// Restate-then-translate with consistency repair
    #[serde(alias = "deep_thought")]
    Deep,
}

impl TranslateMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Precise => "Precise",
            Self::Deep => "Deep",
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Deep)
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

    // @field: Base URL of the chat-completions API
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint) = match provider_type {
            TranslationProvider::Ollama => (default_ollama_model(), default_ollama_endpoint()),
            TranslationProvider::OpenAI => (default_openai_model(), default_openai_endpoint()),
            TranslationProvider::LMStudio => (default_lmstudio_model(), default_lmstudio_endpoint()),
        };
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Whether to translate at all
    #[serde(default = "default_true")]
    pub need_translate: bool,

    /// Translation strategy
    #[serde(default)]
    pub mode: TranslateMode,

    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,

    /// Cues per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Cues of the previous batch repeated as context
    #[serde(default = "default_context_overlap")]
    pub context_overlap: usize,

    /// Retry rounds before falling back to the original text
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Batch size used when re-splitting batches that failed in the first round
    #[serde(default = "default_rechunk_size")]
    pub rechunk_size: usize,

    /// Attempts a strategy makes on one batch before reporting failure
    #[serde(default = "default_strategy_attempts")]
    pub strategy_attempts: usize,

    /// Strip trailing punctuation from both lines of each cue
    #[serde(default)]
    pub remove_punctuation: bool,

    /// Audio type code (see `language_utils::AUDIO_TYPES`)
    #[serde(default = "default_audio_type")]
    pub audio_type: String,

    /// Subject code (see `language_utils::SUBJECT_CONTENT`)
    #[serde(default = "default_subject_content")]
    pub subject_content: String,

    /// Tone code (see `language_utils::STYLE_LANGUAGE`)
    #[serde(default = "default_style_language")]
    pub style_language: String,

    /// Directory holding prompt overrides (fast.txt, precise.txt, deep.txt, summarizer.txt)
    #[serde(default)]
    pub prompt_dir: Option<PathBuf>,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Thresholds of the segmentation pipeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Gap that always closes a clause (ms)
    #[serde(default = "default_max_gap_ms")]
    pub max_gap_ms: u64,

    /// Number of recent gaps averaged for anomaly detection
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Gap-to-mean ratio that counts as anomalous
    #[serde(default = "default_gap_ratio")]
    pub gap_ratio: f64,

    /// Clause length that must be exceeded before an anomalous gap closes it
    #[serde(default = "default_min_group_len")]
    pub min_group_len: usize,

    /// Word budget per cue for Latin-script text
    #[serde(default = "default_max_words_latin")]
    pub max_words_latin: usize,

    /// Word budget per cue for CJK text
    #[serde(default = "default_max_words_cjk")]
    pub max_words_cjk: usize,

    /// Lowercase Latin word tokens
    #[serde(default = "default_true")]
    pub lowercase_words: bool,

    /// Re-split phrase-level input into word units first
    #[serde(default = "default_true")]
    pub split_phrase_units: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_gap_ms: default_max_gap_ms(),
            window_size: default_window_size(),
            gap_ratio: default_gap_ratio(),
            min_group_len: default_min_group_len(),
            max_words_latin: default_max_words_latin(),
            max_words_cjk: default_max_words_cjk(),
            lowercase_words: true,
            split_phrase_units: true,
        }
    }
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub layout: Layout,

    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,

    #[serde(default)]
    pub ass_style: AssStyleSheet,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            formats: default_formats(),
            ass_style: AssStyleSheet::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    40
}

fn default_context_overlap() -> usize {
    2
}

fn default_max_rounds() -> usize {
    40
}

fn default_rechunk_size() -> usize {
    4
}

fn default_strategy_attempts() -> usize {
    2
}

fn default_audio_type() -> String {
    "movie".to_string()
}

fn default_subject_content() -> String {
    "entertainment".to_string()
}

fn default_style_language() -> String {
    "calm".to_string()
}

fn default_max_gap_ms() -> u64 {
    1500
}

fn default_window_size() -> usize {
    5
}

fn default_gap_ratio() -> f64 {
    3.0
}

fn default_min_group_len() -> usize {
    5
}

fn default_max_words_latin() -> usize {
    10
}

fn default_max_words_cjk() -> usize {
    15
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Srt]
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_lmstudio_endpoint() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

impl Config {
    /// Load the config at `path`, writing a default one first when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_source_language(&self.source_language)?;
        language_utils::validate_target_language(&self.target_language)?;

        let t = &self.translation;
        if t.need_translate
            && t.provider == TranslationProvider::OpenAI
            && t.get_api_key().is_empty()
        {
            return Err(anyhow!("Translation API key is required for OpenAI provider"));
        }
        if t.batch_size == 0 || t.rechunk_size == 0 {
            return Err(anyhow!("batch_size and rechunk_size must be positive"));
        }
        if t.context_overlap >= t.batch_size {
            return Err(anyhow!(
                "context_overlap ({}) must be smaller than batch_size ({})",
                t.context_overlap,
                t.batch_size
            ));
        }
        if t.max_rounds == 0 || t.strategy_attempts == 0 {
            return Err(anyhow!("max_rounds and strategy_attempts must be at least 1"));
        }

        let s = &self.segmentation;
        if s.max_words_latin == 0 || s.max_words_cjk == 0 {
            return Err(anyhow!("Segmentation word budgets must be positive"));
        }

        if self.output.formats.is_empty() {
            return Err(anyhow!("At least one output format is required"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "auto".to_string(),
            target_language: "zh-hans".to_string(),
            translation: TranslationConfig::default(),
            segmentation: SegmentationConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map_or_else(default_timeout_secs, |p| p.timeout_secs)
    }

    /// Mutable access to the active provider entry, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(idx) = self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            &mut self.available_providers[idx]
        } else {
            self.available_providers.push(ProviderConfig::new(self.provider.clone()));
            let last = self.available_providers.len() - 1;
            &mut self.available_providers[last]
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            need_translate: true,
            mode: TranslateMode::default(),
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
            batch_size: default_batch_size(),
            context_overlap: default_context_overlap(),
            max_rounds: default_max_rounds(),
            rechunk_size: default_rechunk_size(),
            strategy_attempts: default_strategy_attempts(),
            remove_punctuation: false,
            audio_type: default_audio_type(),
            subject_content: default_subject_content(),
            style_language: default_style_language(),
            prompt_dir: None,
        }
    }
}
