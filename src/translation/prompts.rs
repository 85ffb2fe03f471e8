/*!
 * System prompts and request messages for subtitle translation.
 *
 * Each translate mode has a default system prompt; any of them, and the
 * summarizer prompt, can be overridden by a text file in the configured
 * prompt directory (`fast.txt`, `precise.txt`, `deep.txt`, `summarizer.txt`).
 * Templates use bracketed placeholders such as `[TargetLanguage]`.
 */

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::app_config::{TranslateMode, TranslationConfig};
use crate::language_utils::{self, AUDIO_TYPES, STYLE_LANGUAGE, SUBJECT_CONTENT};

/// Literal translation
pub const TRANSLATE_PROMPT_FAST: &str = r#"You are a subtitle translator. Translate each [SourceLanguage] subtitle line of a [AudioType] about [SubjectContent] into [TargetLanguage].

Rules:
- Translate literally, line by line. Never merge, split, drop or reorder lines.
- Keep the keys of the input object unchanged.
- Return ONLY a JSON object mapping every input key to its translation, with exactly as many entries as the input."#;

/// Idiomatic translation
pub const TRANSLATE_PROMPT_PRECISE: &str = r#"You are an expert subtitle translator working on a [AudioType] about [SubjectContent]. The speaker's tone is [StyleLanguage].

Translate every [SourceLanguage] subtitle line into natural, idiomatic [TargetLanguage]:
- Preserve meaning and emotion, and keep lines short enough to read on screen.
- Use the surrounding lines for context, but translate each line on its own. Never merge, split, drop or reorder lines.
- Keep names and technical terms consistent.

Return ONLY a JSON object mapping every input key to its translation, with exactly as many entries as the input."#;

/// Restate, then translate
pub const TRANSLATE_PROMPT_DEEP: &str = r#"You are a subtitle editor and translator. The subtitles come from automatic speech recognition of a [AudioType] about [SubjectContent] and may contain recognition errors.

For every line:
1. Correct obvious recognition errors (misheard words, wrong terms, broken punctuation) while keeping the wording as close to the original as possible. This is the optimized subtitle.
2. Translate the optimized subtitle into [TargetLanguage] in a [StyleLanguage] tone. This is the revised translation.

Never merge, split, drop or reorder lines. Use the reference material, when given, to fix names and terms.

Return ONLY a JSON object of the form:
{"<key>": {"optimized_subtitle": "<corrected line>", "revised_translation": "<translation>"}}
with one entry per input key."#;

/// Context extraction for deep mode
pub const SUMMARIZER_PROMPT: &str = r#"You are a content analyst. Read the transcript of a video and write a short reference note for a translator:
- the topic and setting in one or two sentences
- people, places and organisations mentioned, with correct spelling
- technical terms and recurring phrases, with the intended meaning

Answer in plain text, at most 300 words."#;

/// Maximum number of characters of transcript sent to the summarizer
pub const SUMMARY_INPUT_MAX_CHARS: usize = 3000;

/// Values substituted into prompt placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub target_language: String,
    pub source_language: String,
    pub audio_type: String,
    pub subject_content: String,
    pub style_language: String,
}

impl PromptContext {
    /// Resolve codes to the descriptions the model sees
    pub fn new(source_language: &str, target_language: &str, config: &TranslationConfig) -> Self {
        Self {
            target_language: language_utils::describe_language(target_language),
            source_language: language_utils::describe_language(source_language),
            audio_type: language_utils::describe(AUDIO_TYPES, &config.audio_type),
            subject_content: language_utils::describe(SUBJECT_CONTENT, &config.subject_content),
            style_language: language_utils::describe(STYLE_LANGUAGE, &config.style_language),
        }
    }

    /// Fill the placeholders of `template`
    pub fn render(&self, template: &str) -> String {
        template
            .replace("[TargetLanguage]", &self.target_language)
            .replace("[SourceLanguage]", &self.source_language)
            .replace("[AudioType]", &self.audio_type)
            .replace("[SubjectContent]", &self.subject_content)
            .replace("[StyleLanguage]", &self.style_language)
    }
}

/// System prompts in use for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PromptCatalog {
    pub fast: String,
    pub precise: String,
    pub deep: String,
    pub summarizer: String,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self {
            fast: TRANSLATE_PROMPT_FAST.to_string(),
            precise: TRANSLATE_PROMPT_PRECISE.to_string(),
            deep: TRANSLATE_PROMPT_DEEP.to_string(),
            summarizer: SUMMARIZER_PROMPT.to_string(),
        }
    }
}

impl PromptCatalog {
    /// Built-in prompts, overridden by any non-empty file found in `dir`
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut catalog = Self::default();
        let Some(dir) = dir else {
            return Ok(catalog);
        };

        for (file_name, slot) in [
            ("fast.txt", &mut catalog.fast),
            ("precise.txt", &mut catalog.precise),
            ("deep.txt", &mut catalog.deep),
            ("summarizer.txt", &mut catalog.summarizer),
        ] {
            let path = dir.join(file_name);
            if !path.is_file() {
                debug!("Prompt file not found, using built-in prompt: {}", path.display());
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
            if !content.trim().is_empty() {
                *slot = content;
            }
        }

        Ok(catalog)
    }

    pub fn for_mode(&self, mode: TranslateMode) -> &str {
        match mode {
            TranslateMode::Fast => &self.fast,
            TranslateMode::Precise => &self.precise,
            TranslateMode::Deep => &self.deep,
        }
    }
}

/// User message of a fast or precise request
pub fn normal_user_message(batch_json: &str, target_description: &str) -> String {
    format!(
        "Please translate the following subtitles to ({}):\n```\n{}\n```",
        target_description, batch_json
    )
}

/// User message of a deep request, with the optional reference note
pub fn deep_user_message(batch_json: &str, target_description: &str, summary: &str) -> String {
    let mut content = format!(
        "Correct the original subtitles and translate them to {}:\n<input_subtitle>{}</input_subtitle>",
        target_description, batch_json
    );
    if !summary.trim().is_empty() {
        content.push_str(&format!(
            "\nReference material for correcting, optimizing and translating the subtitles:\n<prompt>{}</prompt>\n",
            summary
        ));
    }
    content
}

/// User message of a summarizer request; the transcript is truncated
pub fn summarizer_user_message(transcript: &str) -> String {
    let clipped: String = transcript.chars().take(SUMMARY_INPUT_MAX_CHARS).collect();
    format!("Video content to summarize:\n{}", clipped)
}
