/*!
 * Fault-tolerant batch translation of subtitle cues.
 *
 * - `batch`: chunking of a subtitle map into overlapping batches
 * - `aligner`: LCS line alignment of model output onto source lines
 * - `similarity`: character-level similarity ratio
 * - `repair`: consistency check of restated batches (deep mode)
 * - `response`: lenient JSON parsing of model answers
 * - `prompts`: system prompts and request messages
 * - `strategy`: per-batch strategies with local retries
 * - `orchestrator`: bounded retry/re-chunk loop with verbatim fallback
 * - `core`: the service tying provider, prompts and orchestrator together
 */

pub mod aligner;
pub mod batch;
pub mod core;
pub mod orchestrator;
pub mod prompts;
pub mod repair;
pub mod response;
pub mod similarity;
pub mod strategy;

pub use self::aligner::{align_sequences, AlignedPair};
pub use self::batch::{group_subtitles, Batch};
pub use self::core::TranslationService;
pub use self::orchestrator::{Orchestrator, ProgressCallback, TranslationOutcome};
pub use self::repair::{repair_restatement, RestatedLine};
pub use self::similarity::similarity_ratio;
pub use self::strategy::{BatchStrategy, DeepStrategy, NormalStrategy, PunctuationFilter, StrategyContext};
