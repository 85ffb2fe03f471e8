/*!
 * Core translation service implementation.
 *
 * `TranslationService` wires the configured provider, the prompt catalog
 * and the orchestrator together and writes the results back into a
 * `CueSequence`.
 */

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use super::orchestrator::{Orchestrator, ProgressCallback, TranslationOutcome};
use super::prompts::{self, PromptCatalog, PromptContext};
use super::strategy::{BatchStrategy, DeepStrategy, NormalStrategy, PunctuationFilter, StrategyContext};
use crate::app_config::{TranslateMode, TranslationConfig, TranslationProvider};
use crate::formats::Layout;
use crate::language_utils;
use crate::providers::openai::OpenAI;
use crate::providers::{ChatMessage, ChatProvider, ChatRequest};
use crate::subtitle_processor::{CueSequence, SubtitleMap};

/// Main translation service for subtitle translation
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Chat provider
    provider: Arc<ChatProvider>,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// System prompts in use
    prompts: PromptCatalog,
}

impl TranslationService {
    /// Create a service talking to the configured provider
    pub fn new(config: TranslationConfig, source_language: &str, target_language: &str) -> Result<Self> {
        let api_key = match config.provider {
            // local servers ignore the key but some proxies insist on one
            TranslationProvider::LMStudio if config.get_api_key().is_empty() => "lm-studio".to_string(),
            TranslationProvider::Ollama if config.get_api_key().is_empty() => "ollama".to_string(),
            _ => config.get_api_key(),
        };

        let endpoint = config.get_endpoint();
        url::Url::parse(&endpoint).map_err(|e| anyhow!("Invalid endpoint '{}': {}", endpoint, e))?;

        let client = OpenAI::new_with_config(
            api_key,
            endpoint,
            config.get_timeout_secs(),
            config.common.retry_count,
            config.common.retry_backoff_ms,
        );

        Self::with_provider(config, source_language, target_language, Arc::new(client))
    }

    /// Create a service around an existing provider
    pub fn with_provider(
        config: TranslationConfig,
        source_language: &str,
        target_language: &str,
        provider: Arc<ChatProvider>,
    ) -> Result<Self> {
        let prompts = PromptCatalog::load(config.prompt_dir.as_deref())?;
        Ok(Self {
            provider,
            config,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            prompts,
        })
    }

    fn chat_request(&self, system: String, user: String) -> ChatRequest {
        ChatRequest::new(self.config.get_model(), vec![ChatMessage::system(system), ChatMessage::user(user)])
            .temperature(self.config.common.temperature)
    }

    /// Send a tiny request to check the endpoint, model and credentials
    pub async fn test_connection(&self) -> Result<()> {
        info!(
            "Testing connection to {} with model {}",
            self.config.provider.display_name(),
            self.config.get_model()
        );
        let request = ChatRequest::new(self.config.get_model(), vec![ChatMessage::user("Hello!")]).max_tokens(100);
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| anyhow!("Connection test failed: {}", e))?;

        if response.choices.is_empty() {
            return Err(anyhow!("Connection test failed: empty response from {}", self.config.provider));
        }
        Ok(())
    }

    /// Reference note on the whole transcript for deep mode.
    ///
    /// Failures are logged and yield an empty note.
    pub async fn summarize(&self, transcript: &str) -> String {
        info!("Extracting a summary of the transcript");
        let request = self.chat_request(self.prompts.summarizer.clone(), prompts::summarizer_user_message(transcript));
        match self.provider.complete(request).await {
            Ok(response) => {
                let summary = response.text().trim().to_string();
                info!("Summary:\n{}", summary);
                summary
            }
            Err(e) => {
                error!("Failed to summarize the transcript: {}", e);
                String::new()
            }
        }
    }

    fn strategy_context(&self) -> StrategyContext {
        let prompt_context = PromptContext::new(&self.source_language, &self.target_language, &self.config);
        StrategyContext {
            provider: Arc::clone(&self.provider),
            model: self.config.get_model(),
            temperature: self.config.common.temperature,
            system_prompt: prompt_context.render(self.prompts.for_mode(self.config.mode)),
            target_description: prompt_context.target_language,
            attempts: self.config.strategy_attempts,
            punctuation: PunctuationFilter {
                enabled: self.config.remove_punctuation,
                cjk_only: language_utils::is_cjk_only(&self.source_language),
            },
        }
    }

    /// Build the strategy for the configured mode
    pub fn strategy(&self, summary: &str) -> Box<dyn BatchStrategy> {
        let ctx = self.strategy_context();
        match self.config.mode {
            TranslateMode::Deep => Box::new(DeepStrategy::new(ctx, summary)),
            TranslateMode::Fast | TranslateMode::Precise => Box::new(NormalStrategy::new(ctx)),
        }
    }

    /// Translate a subtitle map; every key comes back
    pub async fn translate_map(
        &self,
        subtitles: &SubtitleMap,
        summary: &str,
        orchestrator: &Orchestrator,
    ) -> TranslationOutcome {
        let strategy = self.strategy(summary);
        orchestrator.run(subtitles, strategy.as_ref()).await
    }

    /// Translate every cue in place to `"original\ntranslation"`
    pub async fn translate_cues(
        &self,
        cues: &mut CueSequence,
        progress: Option<ProgressCallback>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TranslationOutcome> {
        if !self.config.need_translate {
            warn!("Translation is disabled in the configuration, keeping original text");
            return Ok(TranslationOutcome::default());
        }
        if cues.is_empty() {
            return Ok(TranslationOutcome::default());
        }

        info!(
            "Translating {} cues from {} to {} in {} mode",
            cues.len(),
            self.source_language,
            self.target_language,
            self.config.mode.display_name()
        );

        let summary = if self.config.mode.is_deep() {
            self.summarize(&cues.to_txt(Layout::OriginalOnly)).await
        } else {
            String::new()
        };

        let mut orchestrator = Orchestrator::from_config(&self.config);
        if let Some(progress) = progress {
            orchestrator = orchestrator.with_progress(progress);
        }
        if let Some(cancel) = cancel {
            orchestrator = orchestrator.with_cancel_flag(cancel);
        }

        let outcome = self.translate_map(&cues.to_subtitle_map(), &summary, &orchestrator).await;
        cues.apply_translations(&outcome.entries)?;

        info!(
            "Translation finished: {} cues, {} kept original text, {} batch attempts",
            outcome.entries.len(),
            outcome.degraded.len(),
            outcome.attempts
        );
        Ok(outcome)
    }
}
