use std::collections::VecDeque;
use log::debug;

use crate::subtitle_processor::Segment;

/// Groups raw units into clauses by inspecting the silence between them.
///
/// Two rules close a group: a gap larger than `gap_ratio` times the mean of
/// the last `window_size` gaps once the group is long enough, and any gap
/// above `max_gap_ms`.
#[derive(Debug, Clone)]
pub struct TemporalGrouper {
    pub max_gap_ms: i64,
    pub window_size: usize,
    pub gap_ratio: f64,
    pub min_group_len: usize,
}

impl Default for TemporalGrouper {
    fn default() -> Self {
        Self {
            max_gap_ms: 1500,
            window_size: 5,
            gap_ratio: 3.0,
            min_group_len: 5,
        }
    }
}

impl TemporalGrouper {
    pub fn group(&self, units: Vec<Segment>) -> Vec<Vec<Segment>> {
        let mut units = units.into_iter();
        let Some(first) = units.next() else {
            return Vec::new();
        };

        let mut groups = Vec::new();
        let mut window: VecDeque<i64> = VecDeque::with_capacity(self.window_size + 1);
        let mut prev_end = first.end_ms as i64;
        let mut current = vec![first];

        for unit in units {
            let gap = unit.start_ms as i64 - prev_end;
            prev_end = unit.end_ms as i64;

            window.push_back(gap);
            if window.len() > self.window_size {
                window.pop_front();
            }
            if self.window_size > 0 && window.len() == self.window_size {
                let mean = window.iter().sum::<i64>() as f64 / window.len() as f64;
                if gap as f64 > mean * self.gap_ratio && current.len() > self.min_group_len {
                    debug!("Large gap {}ms against mean {:.1}ms, closing group of {}", gap, mean, current.len());
                    groups.push(std::mem::take(&mut current));
                    window.clear();
                }
            }

            if gap > self.max_gap_ms {
                if !current.is_empty() {
                    debug!("Gap {}ms over limit, closing group of {}", gap, current.len());
                    groups.push(std::mem::take(&mut current));
                }
                window.clear();
            }

            current.push(unit);
        }

        if !current.is_empty() {
            groups.push(current);
        }
        groups
    }
}
