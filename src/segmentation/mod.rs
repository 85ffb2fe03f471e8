/*!
 * Segmentation of raw word-level transcription units into subtitle cues.
 *
 * The pipeline runs in three stages:
 * - `temporal`: group units into clauses using silence between them
 * - `boundary`: cut long clauses at connector words
 * - `splitter`: bisect whatever is still too long at its widest pause
 *
 * `script` holds the mixed-script word counting used by all three.
 */

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::SegmentationConfig;
use crate::subtitle_processor::{CueSequence, Segment};

pub mod boundary;
pub mod script;
pub mod splitter;
pub mod temporal;

pub use self::boundary::BoundaryRefiner;
pub use self::splitter::LengthSplitter;
pub use self::temporal::TemporalGrouper;

use self::script::{count_words, is_pure_punctuation};

static LATIN_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9']+$").unwrap());

/// Runs the full segmentation pipeline
#[derive(Debug, Clone)]
pub struct Segmentor {
    grouper: TemporalGrouper,
    refiner: BoundaryRefiner,
    splitter: LengthSplitter,
    lowercase_words: bool,
    split_phrase_units: bool,
}

impl Default for Segmentor {
    fn default() -> Self {
        Self::new(&SegmentationConfig::default())
    }
}

impl Segmentor {
    pub fn new(config: &SegmentationConfig) -> Self {
        Self {
            grouper: TemporalGrouper {
                max_gap_ms: config.max_gap_ms as i64,
                window_size: config.window_size,
                gap_ratio: config.gap_ratio,
                min_group_len: config.min_group_len,
            },
            refiner: BoundaryRefiner {
                max_words_latin: config.max_words_latin,
                max_words_cjk: config.max_words_cjk,
            },
            splitter: LengthSplitter::new(config.max_words_latin, config.max_words_cjk),
            lowercase_words: config.lowercase_words,
            split_phrase_units: config.split_phrase_units,
        }
    }

    /// Drop punctuation-only units and normalize Latin word tokens so they
    /// concatenate with a trailing space
    pub fn preprocess(&self, units: Vec<Segment>) -> Vec<Segment> {
        units
            .into_iter()
            .filter(|unit| !is_pure_punctuation(&unit.text))
            .map(|mut unit| {
                let trimmed = unit.text.trim();
                if LATIN_TOKEN_REGEX.is_match(trimmed) {
                    unit.text = if self.lowercase_words {
                        format!("{} ", trimmed.to_lowercase())
                    } else {
                        format!("{} ", trimmed)
                    };
                }
                unit
            })
            .collect()
    }

    /// Group, refine and split preprocessed units into cues
    pub fn process_by_rules(&self, units: Vec<Segment>) -> Vec<Segment> {
        let groups = self.grouper.group(units);
        debug!("Temporal grouping produced {} groups", groups.len());

        let mut refined = Vec::with_capacity(groups.len());
        for group in groups {
            let merged: String = group.iter().map(|s| s.text.as_str()).collect();
            if count_words(&merged) > self.refiner.max_words_for(&merged) {
                refined.extend(self.refiner.refine(group));
            } else {
                refined.push(group);
            }
        }
        debug!("Boundary refinement produced {} groups", refined.len());

        refined.iter().flat_map(|group| self.splitter.split(group)).collect()
    }

    /// Full pipeline over a cue sequence of raw units.
    ///
    /// Phrase-level input is first re-split into word units when enabled.
    pub fn segment(&self, mut units: CueSequence) -> CueSequence {
        let before = units.len();
        if self.split_phrase_units && !units.is_word_timestamp() {
            info!("Input is phrase-level, re-splitting into word units");
            units.split_to_word_segments();
        }

        let preprocessed = self.preprocess(units.into_segments());
        let mut cues = CueSequence::new(self.process_by_rules(preprocessed));
        cues.normalize_spacing();

        info!("Segmented {} units into {} cues", before, cues.len());
        cues
    }
}
