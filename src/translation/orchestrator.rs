/*!
 * Bounded retry loop over translation batches.
 *
 * Round 0 tries every batch and re-splits the failures into small batches;
 * later rounds retry what is left as is. Whatever still fails after the
 * last round keeps its original text on both lines, so every input key is
 * always present in the output.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::batch::{group_subtitles, Batch};
use super::strategy::BatchStrategy;
use crate::app_config::TranslationConfig;
use crate::subtitle_processor::SubtitleMap;

/// Called after every batch attempt with (attempted, planned)
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Result of one orchestrated translation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationOutcome {
    /// `index -> "original\ntranslation"` for every input index
    pub entries: SubtitleMap,
    /// Indices that fell back to their original text
    pub degraded: Vec<usize>,
    /// Rounds actually run
    pub rounds: usize,
    /// Batch attempts made
    pub attempts: usize,
}

/// Drives a `BatchStrategy` over a whole subtitle map
#[derive(Clone)]
pub struct Orchestrator {
    batch_size: usize,
    overlap: usize,
    max_rounds: usize,
    rechunk_size: usize,
    progress: Option<ProgressCallback>,
    cancel: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("batch_size", &self.batch_size)
            .field("overlap", &self.overlap)
            .field("max_rounds", &self.max_rounds)
            .field("rechunk_size", &self.rechunk_size)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(40, 2)
    }
}

impl Orchestrator {
    pub fn new(batch_size: usize, overlap: usize) -> Self {
        Self {
            batch_size,
            overlap,
            max_rounds: 40,
            rechunk_size: 4,
            progress: None,
            cancel: None,
        }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.batch_size, config.context_overlap)
            .with_max_rounds(config.max_rounds)
            .with_rechunk_size(config.rechunk_size)
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_rechunk_size(mut self, rechunk_size: usize) -> Self {
        self.rechunk_size = rechunk_size;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Checked between batches; once set, remaining batches keep their original text
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Translate every entry of `subtitles` through `strategy`
    pub async fn run(&self, subtitles: &SubtitleMap, strategy: &dyn BatchStrategy) -> TranslationOutcome {
        let mut outcome = TranslationOutcome::default();
        let mut queue: Vec<Batch> = group_subtitles(subtitles, self.batch_size, self.overlap);
        let mut planned = queue.len();

        info!(
            "Translating {} cues in {} batches with the {} strategy",
            subtitles.len(),
            queue.len(),
            strategy.name()
        );

        for round in 0..self.max_rounds {
            if queue.is_empty() || self.is_cancelled() {
                break;
            }
            outcome.rounds = round + 1;
            if round > 0 {
                info!("Retry round {}: {} batches left", round, queue.len());
            }

            let mut retry = Vec::new();
            for batch in std::mem::take(&mut queue) {
                if self.is_cancelled() {
                    retry.push(batch);
                    continue;
                }

                outcome.attempts += 1;
                match strategy.translate_batch(&batch).await {
                    Ok(translated) => {
                        for (key, text) in translated {
                            if subtitles.contains_key(&key) {
                                outcome.entries.entry(key).or_insert(text);
                            } else {
                                debug!("Ignoring unknown index {} in batch {}", key, batch.label());
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Batch {} failed in round {}, will retry: {}", batch.label(), round, e);
                        if round == 0 {
                            let pieces = batch.rechunk(self.rechunk_size, self.overlap);
                            planned += pieces.len();
                            retry.extend(pieces);
                        } else {
                            planned += 1;
                            retry.push(batch);
                        }
                    }
                }

                if let Some(progress) = &self.progress {
                    progress(outcome.attempts, planned);
                }
            }
            queue = retry;
        }

        if self.is_cancelled() {
            warn!("Translation cancelled, {} batches left untranslated", queue.len());
        }

        // verbatim fallback for whatever never resolved
        let unresolved = queue
            .iter()
            .flat_map(|batch| batch.entries.iter())
            .chain(subtitles.iter());
        for (key, original) in unresolved {
            if !outcome.entries.contains_key(key) && subtitles.contains_key(key) {
                outcome.entries.insert(*key, format!("{}\n{}", original, original));
                outcome.degraded.push(*key);
            }
        }

        if !outcome.degraded.is_empty() {
            outcome.degraded.sort_unstable();
            warn!(
                "{} cues kept their original text after {} rounds: {:?}",
                outcome.degraded.len(),
                outcome.rounds,
                outcome.degraded
            );
        }

        outcome
    }
}
