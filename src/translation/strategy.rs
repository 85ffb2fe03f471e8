/*!
 * Per-batch translation strategies.
 *
 * A strategy turns one batch into `index -> "original\ntranslation"` or
 * fails. Each strategy retries locally a few times without backoff before
 * reporting the failure; the orchestrator owns the long retry loop.
 */

use async_trait::async_trait;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::batch::Batch;
use super::prompts;
use super::repair::repair_restatement;
use super::response::{as_flat_lines, as_restated_lines, parse_lenient};
use crate::errors::TranslationError;
use crate::providers::{ChatMessage, ChatProvider, ChatRequest};
use crate::segmentation::script::is_mainly_cjk;
use crate::subtitle_processor::SubtitleMap;

static TRAILING_PUNCTUATION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,.!?;:，。！？；：、]+$").unwrap());

/// CJK share above which a line counts as CJK for punctuation stripping
pub const PUNCTUATION_CJK_RATIO: f64 = 0.4;

/// Translates one batch at a time
#[async_trait]
pub trait BatchStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Translate every entry of `batch`, keyed like the batch
    async fn translate_batch(&self, batch: &Batch) -> Result<SubtitleMap, TranslationError>;
}

/// Optional removal of trailing punctuation from cue lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PunctuationFilter {
    pub enabled: bool,
    /// Source language writes without spaces; only CJK lines are stripped then
    pub cjk_only: bool,
}

impl PunctuationFilter {
    pub fn apply(&self, text: &str) -> String {
        if !self.enabled || (self.cjk_only && !is_mainly_cjk(text, PUNCTUATION_CJK_RATIO)) {
            return text.to_string();
        }
        TRAILING_PUNCTUATION_REGEX.replace(text.trim(), "").into_owned()
    }

    /// `"<original>\n<translation>"` with both lines filtered
    pub fn join(&self, original: &str, translation: &str) -> String {
        format!("{}\n{}", self.apply(original), self.apply(translation))
    }
}

/// Everything a strategy needs to talk to the model
#[derive(Debug, Clone)]
pub struct StrategyContext {
    pub provider: Arc<ChatProvider>,
    pub model: String,
    pub temperature: f32,
    /// System prompt with placeholders already filled
    pub system_prompt: String,
    /// Target language as shown to the model
    pub target_description: String,
    /// Local attempts per batch
    pub attempts: usize,
    pub punctuation: PunctuationFilter,
}

impl StrategyContext {
    async fn ask(&self, user_content: String) -> Result<String, TranslationError> {
        let request = ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::system(self.system_prompt.clone()), ChatMessage::user(user_content)],
        )
        .temperature(self.temperature);

        let response = self.provider.complete(request).await?;
        Ok(response.text())
    }

    /// Pair batch entries with `translations` by position
    pub fn build_translated(&self, batch: &Batch, translations: &[String]) -> SubtitleMap {
        batch
            .entries
            .iter()
            .enumerate()
            .map(|(i, (key, original))| {
                let translation = translations.get(i).map_or("", String::as_str);
                (*key, self.punctuation.join(original, translation))
            })
            .collect()
    }

    async fn with_attempts<F, Fut>(&self, batch: &Batch, mut attempt: F) -> Result<SubtitleMap, TranslationError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<SubtitleMap, TranslationError>> + Send,
    {
        let attempts = self.attempts.max(1);
        let mut last_error = None;
        for n in 1..=attempts {
            match attempt().await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    debug!("Batch {} attempt {}/{} failed: {}", batch.label(), n, attempts, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| TranslationError::MalformedResponse("no attempt made".to_string())))
    }
}

/// Fast and precise modes: one flat `{index: translation}` answer per batch
#[derive(Debug, Clone)]
pub struct NormalStrategy {
    ctx: StrategyContext,
}

impl NormalStrategy {
    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    async fn attempt(&self, batch: &Batch) -> Result<SubtitleMap, TranslationError> {
        let content = prompts::normal_user_message(&batch.to_json().to_string(), &self.ctx.target_description);
        let answer = self.ctx.ask(content).await?;
        let lines = as_flat_lines(&parse_lenient(&answer)?)?;

        if lines.len() != batch.len() {
            warn!(
                "Batch {} came back with {} of {} lines:\n{:?}",
                batch.label(),
                lines.len(),
                batch.len(),
                self.ctx.build_translated(batch, &lines)
            );
            return Err(TranslationError::MalformedResponse(format!(
                "expected {} lines, got {}",
                batch.len(),
                lines.len()
            )));
        }

        Ok(self.ctx.build_translated(batch, &lines))
    }
}

#[async_trait]
impl BatchStrategy for NormalStrategy {
    fn name(&self) -> &str {
        "normal"
    }

    async fn translate_batch(&self, batch: &Batch) -> Result<SubtitleMap, TranslationError> {
        info!("Translating cues {} ({} lines)", batch.label(), batch.len());
        self.ctx.with_attempts(batch, || self.attempt(batch)).await
    }
}

/// Deep mode: restate each line, translate the restatement, then validate
/// the restatement against the source before accepting the batch
#[derive(Debug, Clone)]
pub struct DeepStrategy {
    ctx: StrategyContext,
    /// Reference note from the summarizer, possibly empty
    summary: String,
}

impl DeepStrategy {
    pub fn new(ctx: StrategyContext, summary: impl Into<String>) -> Self {
        Self {
            ctx,
            summary: summary.into(),
        }
    }

    async fn attempt(&self, batch: &Batch) -> Result<SubtitleMap, TranslationError> {
        let content = prompts::deep_user_message(
            &batch.to_json().to_string(),
            &self.ctx.target_description,
            &self.summary,
        );
        let answer = self.ctx.ask(content).await?;
        let restated = as_restated_lines(&parse_lenient(&answer)?)?;
        let repaired = repair_restatement(batch, &restated)?;

        Ok(repaired
            .into_iter()
            .map(|(key, (line, translation))| (key, self.ctx.punctuation.join(&line, &translation)))
            .collect())
    }
}

#[async_trait]
impl BatchStrategy for DeepStrategy {
    fn name(&self) -> &str {
        "deep"
    }

    async fn translate_batch(&self, batch: &Batch) -> Result<SubtitleMap, TranslationError> {
        info!("Deep-translating cues {} ({} lines)", batch.label(), batch.len());
        self.ctx.with_attempts(batch, || self.attempt(batch)).await
    }
}
