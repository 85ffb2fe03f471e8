/*!
 * # cuesmith
 *
 * Turns word-level speech recognition output into readable subtitle cues and
 * translates them with an LLM, batch by batch, without ever losing a cue.
 *
 * ## Features
 *
 * - Regroup word timings (`.srt` or `.json`) into cues by pauses, sentence
 *   punctuation and length budgets, with CJK-aware word counting
 * - Translate through any OpenAI-compatible endpoint (Ollama, LM Studio, OpenAI)
 * - Fast, precise and deep modes; deep mode restates lines first and checks
 *   the restatement against the source before accepting it
 * - Bounded retries with re-chunking; cues that never translate keep their
 *   original text
 * - SRT, TXT, LRC, ASS and JSON output in four bilingual layouts
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Cue model, SRT/JSON parsing and saving
 * - `segmentation`: Temporal grouping, boundary refinement and length splitting
 * - `formats`: Text serializations and bilingual layouts
 * - `translation`: Batching, alignment, repair and the retry orchestrator
 * - `providers`: Chat completion clients
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod language_utils;
pub mod providers;
pub mod segmentation;
pub mod subtitle_processor;
pub mod translation;

pub use app_config::Config;
pub use errors::{ProviderError, SubtitleError, TranslationError};
pub use segmentation::Segmentor;
pub use subtitle_processor::{CueSequence, Segment, SubtitleMap};
pub use translation::TranslationService;
