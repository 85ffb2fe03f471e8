/*!
 * Consistency repair for restated batches.
 *
 * In deep mode the model first rewrites ("restates") each source line and
 * then translates the rewrite. Before accepting such a batch the restated
 * lines are aligned back onto the source lines and compared; a batch whose
 * restatement drifted too far is rejected so the orchestrator retries it.
 */

use log::{debug, error};
use std::collections::{BTreeMap, HashMap};

use super::aligner::align_sequences;
use super::batch::Batch;
use super::similarity::similarity_ratio;
use crate::errors::TranslationError;

/// Per-line similarity at or above which a restated line counts as faithful
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Fraction of faithful lines a batch needs to be accepted
pub const ACCEPTANCE_RATE: f64 = 0.89;

/// One entry of a deep-mode answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestatedLine {
    pub restated: String,
    pub translation: String,
}

impl RestatedLine {
    pub fn new(restated: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            restated: restated.into(),
            translation: translation.into(),
        }
    }
}

/// Pairwise similarity flags over two aligned sequences
pub fn similarity_flags<S: AsRef<str>>(source: &[S], target: &[S], threshold: f64) -> Vec<bool> {
    source
        .iter()
        .zip(target)
        .map(|(a, b)| similarity_ratio(a.as_ref(), b.as_ref()) >= threshold)
        .collect()
}

/// Validate a restated batch and key it back onto the batch indices.
///
/// Returns `index -> (restated line, translation)` for `start_id + offset`.
/// A restated line whose translation is missing gets a single space.
pub fn repair_restatement(
    batch: &Batch,
    restated: &[RestatedLine],
) -> Result<BTreeMap<usize, (String, String)>, TranslationError> {
    let Some(start_id) = batch.start_id() else {
        return Ok(BTreeMap::new());
    };

    let source = batch.lines();
    let restated_lines: Vec<&str> = restated.iter().map(|r| r.restated.as_str()).collect();
    let aligned = align_sequences(&source, &restated_lines);

    let flags = similarity_flags(&aligned.source, &aligned.target, SIMILARITY_THRESHOLD);
    let rate = flags.iter().filter(|f| **f).count() as f64 / flags.len() as f64;
    if rate < ACCEPTANCE_RATE {
        error!("Repair of batch {} failed, similarity rate {:.2}", batch.label(), rate);
        debug!("Source lines: {:?}", source);
        debug!("Restated lines: {:?}", restated_lines);
        return Err(TranslationError::AlignmentRepairFailure { rate });
    }

    // later duplicates of a restated line win, as with a plain dict
    let translations: HashMap<&str, &str> = restated
        .iter()
        .map(|r| (r.restated.as_str(), r.translation.as_str()))
        .collect();

    Ok(aligned
        .target
        .into_iter()
        .enumerate()
        .map(|(offset, line)| {
            let translation = translations.get(line.as_str()).copied().unwrap_or(" ").to_string();
            (start_id + offset, (line, translation))
        })
        .collect())
}
