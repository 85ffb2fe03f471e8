use super::boundary::BoundaryRefiner;
use super::script::count_words;
use crate::subtitle_processor::Segment;

/// Bisects over-long groups at their most anomalous internal pause and
/// merges each resulting piece into a single cue.
#[derive(Debug, Clone, Default)]
pub struct LengthSplitter {
    budget: BoundaryRefiner,
}

impl LengthSplitter {
    pub fn new(max_words_latin: usize, max_words_cjk: usize) -> Self {
        Self {
            budget: BoundaryRefiner {
                max_words_latin,
                max_words_cjk,
            },
        }
    }

    /// Split `group` into cues. Output order follows input order.
    pub fn split(&self, group: &[Segment]) -> Vec<Segment> {
        let mut cues = Vec::new();
        // half-open ranges into `group`; the left half is pushed last so it pops first
        let mut stack = vec![(0usize, group.len())];

        while let Some((lo, hi)) = stack.pop() {
            let part = &group[lo..hi];
            let (Some(first), Some(last)) = (part.first(), part.last()) else {
                continue;
            };

            let merged: String = part.iter().map(|s| s.text.as_str()).collect();
            if part.len() == 1 || count_words(&merged) <= self.budget.max_words_for(&merged) {
                cues.push(Segment::new(merged.trim(), first.start_ms, last.end_ms));
                continue;
            }

            let mut split = split_index(part);
            if split <= 1 {
                split = 0;
            }

            stack.push((lo + split + 1, hi));
            stack.push((lo, lo + split + 1));
        }

        cues
    }
}

fn gap_after(part: &[Segment], i: usize) -> i64 {
    part[i + 1].start_ms as i64 - part[i].end_ms as i64
}

/// Index after which to cut: the middle when all gaps are equal, otherwise
/// the widest gap within the central two thirds (first one on ties).
fn split_index(part: &[Segment]) -> usize {
    let n = part.len();
    let first_gap = gap_after(part, 0);
    if (1..n - 1).all(|i| gap_after(part, i) == first_gap) {
        return n / 2;
    }

    let mut best: Option<(usize, i64)> = None;
    for i in n / 6..(5 * n) / 6 {
        let gap = gap_after(part, i);
        if best.is_none_or(|(_, g)| gap > g) {
            best = Some((i, gap));
        }
    }
    best.map_or(n / 2, |(i, _)| i)
}
