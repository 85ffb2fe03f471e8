/*!
 * Chunking of a subtitle map into overlapping translation batches.
 */

use serde_json::{Map, Value};

use crate::subtitle_processor::SubtitleMap;

/// A contiguous slice of the subtitle map sent to the model in one request.
///
/// The first `context_len` entries repeat the tail of the previous batch so
/// the model sees some preceding dialogue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    pub entries: SubtitleMap,
    pub context_len: usize,
}

impl Batch {
    pub fn new(entries: SubtitleMap, context_len: usize) -> Self {
        Self { entries, context_len }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest index in the batch
    pub fn start_id(&self) -> Option<usize> {
        self.entries.keys().next().copied()
    }

    /// Indices this batch adds beyond its leading context
    pub fn new_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().skip(self.context_len).copied()
    }

    /// Original lines in index order
    pub fn lines(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }

    /// Split into smaller batches with the same overlap rule
    pub fn rechunk(&self, size: usize, overlap: usize) -> Vec<Batch> {
        group_subtitles(&self.entries, size, overlap)
    }

    /// `{"<index>": "<text>"}` object in index order, as shown to the model
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }

    /// Compact label for logs, e.g. `12-51`
    pub fn label(&self) -> String {
        match (self.entries.keys().next(), self.entries.keys().next_back()) {
            (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
            (Some(first), _) => first.to_string(),
            _ => "empty".to_string(),
        }
    }
}

/// Chunk `subtitles` into windows of `step` keys.
///
/// From the second window on, the last `overlap` keys of the previous,
/// already extended, window are prepended. Every key is new in exactly one
/// batch.
pub fn group_subtitles(subtitles: &SubtitleMap, step: usize, overlap: usize) -> Vec<Batch> {
    let step = step.max(1);
    let pairs: Vec<(usize, &String)> = subtitles.iter().map(|(k, v)| (*k, v)).collect();

    let mut batches: Vec<Batch> = Vec::with_capacity(pairs.len().div_ceil(step));
    for window in pairs.chunks(step) {
        let mut entries = SubtitleMap::new();
        let mut context_len = 0;

        if overlap > 0 {
            if let Some(previous) = batches.last() {
                let skip = previous.entries.len().saturating_sub(overlap);
                for (k, v) in previous.entries.iter().skip(skip) {
                    entries.insert(*k, v.clone());
                }
                context_len = entries.len();
            }
        }

        for (k, v) in window {
            entries.insert(*k, (*v).clone());
        }
        batches.push(Batch::new(entries, context_len));
    }

    batches
}
