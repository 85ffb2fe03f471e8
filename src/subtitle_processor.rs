use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::SubtitleError;
use crate::formats::{self, AssStyleSheet, Layout, OutputFormat};

// @module: Cue store - ordered, timed subtitle segments

// @const: SRT timestamp line, tolerant of '.' as millisecond separator
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @const: Tokens used when re-splitting phrase-level units into words
static WORD_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[a-zA-Z']+|\d+",
        r"|[\u{4e00}-\u{9fff}]|[\u{3040}-\u{309f}]|[\u{30a0}-\u{30ff}]|[\u{ac00}-\u{d7af}]",
        r"|[\u{0e00}-\u{0e7f}]|[\u{0600}-\u{06ff}]|[\u{0400}-\u{04ff}]|[\u{0590}-\u{05ff}]",
        r"|[\u{1e00}-\u{1eff}]|[\u{3130}-\u{318f}]",
    ))
    .unwrap()
});

static MULTI_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Characters per phoneme when distributing a unit's duration over its words
const CHARS_PER_PHONEME: usize = 4;

/// Punctuation that must be followed by a space after merging
const SPACED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ':', ';', '。', '，', '！', '？', '：', '；'];

/// Ordered mapping from 1-based cue index to line text
pub type SubtitleMap = BTreeMap<usize, String>;

// @struct: One timed text unit or cue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Segment {
    // @field: Text, "<original>\n<translated>" once translated
    pub text: String,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether `pos_ms` falls inside the cue (start inclusive, end exclusive)
    pub fn contains(&self, pos_ms: u64) -> bool {
        pos_ms >= self.start_ms && pos_ms < self.end_ms
    }

    /// Original and translated halves, split on the first newline
    pub fn split_text(&self) -> (&str, &str) {
        match self.text.split_once('\n') {
            Some((original, translated)) => (original, translated),
            None => (self.text.as_str(), ""),
        }
    }

    // @returns: "HH:MM:SS,mmm --> HH:MM:SS,mmm"
    pub fn to_srt_timestamp(&self) -> String {
        format!("{} --> {}", format_timestamp(self.start_ms), format_timestamp(self.end_ms))
    }

    // @returns: "[MM:SS.cc]" for the start time
    pub fn to_lrc_timestamp(&self) -> String {
        // round half up; 59.995s carries into the next minute
        let centis = self.start_ms.saturating_add(5) / 10;
        let minutes = centis / 6_000;
        let seconds = (centis % 6_000) / 100;
        format!("[{:02}:{:02}.{:02}]", minutes, seconds, centis % 100)
    }

    // @returns: ("H:MM:SS.cc", "H:MM:SS.cc")
    pub fn to_ass_timestamps(&self) -> (String, String) {
        (format_ass_timestamp(self.start_ms), format_ass_timestamp(self.end_ms))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} - {}] {}", self.start_ms, self.end_ms, self.text)
    }
}

/// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

fn format_ass_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let centis = (ms % 1_000) / 10;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Parse an SRT timestamp (HH:MM:SS,mmm or HH:MM:SS.mmm) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
    if parts.len() != 4 {
        return Err(SubtitleError::Parse(format!("Invalid timestamp format: {}", timestamp)));
    }

    let mut values = [0u64; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| SubtitleError::Parse(format!("Invalid timestamp component in {}", timestamp)))?;
    }
    let [hours, minutes, seconds, millis] = values;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(SubtitleError::Parse(format!("Invalid time components in timestamp: {}", timestamp)));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Ordered collection of cues for one media item.
///
/// Construction drops blank cues and sorts by start time (stable), so
/// iteration order is always ascending `start_ms`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueSequence {
    segments: Vec<Segment>,
}

impl CueSequence {
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut segments: Vec<Segment> = segments
            .into_iter()
            .filter(|seg| !seg.text.trim().is_empty())
            .collect();
        segments.sort_by_key(|seg| seg.start_ms);
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Whether the units look word-level: at least 80% are a single ASCII
    /// word or at most four characters long
    pub fn is_word_timestamp(&self) -> bool {
        if self.segments.is_empty() {
            return false;
        }

        let valid = self
            .segments
            .iter()
            .filter(|seg| {
                let trimmed = seg.text.trim();
                (trimmed.split_whitespace().count() == 1 && seg.text.is_ascii())
                    || trimmed.chars().count() <= 4
            })
            .count();

        valid as f64 / self.segments.len() as f64 >= 0.8
    }

    /// Re-split phrase-level units into word or character units.
    ///
    /// Each unit's duration is distributed over its tokens in proportion to
    /// their phoneme count (one phoneme per four characters, rounded up).
    pub fn split_to_word_segments(&mut self) {
        let mut words = Vec::new();

        for seg in &self.segments {
            let tokens: Vec<&str> = WORD_TOKEN_REGEX.find_iter(&seg.text).map(|m| m.as_str()).collect();
            if tokens.is_empty() {
                continue;
            }

            let phonemes = |token: &str| token.chars().count().div_ceil(CHARS_PER_PHONEME);
            let total: usize = tokens.iter().map(|t| phonemes(t)).sum();
            let per_phoneme = seg.duration_ms() as f64 / total.max(1) as f64;

            let mut current = seg.start_ms;
            for token in tokens {
                let duration = (per_phoneme * phonemes(token) as f64) as u64;
                let end = (current + duration).min(seg.end_ms.max(seg.start_ms));
                words.push(Segment::new(token, current, end));
                current = end;
            }
        }

        debug!("Split {} units into {} word units", self.segments.len(), words.len());
        self.segments = words;
    }

    /// Replace segments `start..=end` with one segment spanning them.
    ///
    /// Without explicit `text` the texts are concatenated as-is.
    pub fn merge_segments(&mut self, start: usize, end: usize, text: Option<&str>) -> Result<(), SubtitleError> {
        if end >= self.segments.len() || start > end {
            return Err(SubtitleError::SegmentIndex {
                start,
                end,
                len: self.segments.len(),
            });
        }

        let merged_text = match text {
            Some(t) => t.to_string(),
            None => self.segments[start..=end].iter().map(|s| s.text.as_str()).collect(),
        };
        let merged = Segment::new(merged_text, self.segments[start].start_ms, self.segments[end].end_ms);
        self.segments.splice(start..=end, std::iter::once(merged));
        Ok(())
    }

    /// Merge the segment at `index` with its successor, joining texts with a space
    pub fn merge_with_next(&mut self, index: usize) -> Result<(), SubtitleError> {
        if index >= self.segments.len().saturating_sub(1) {
            return Err(SubtitleError::SegmentIndex {
                start: index,
                end: index.saturating_add(1),
                len: self.segments.len(),
            });
        }

        let next = self.segments.remove(index + 1);
        let current = &mut self.segments[index];
        current.text = format!("{} {}", current.text, next.text);
        current.end_ms = next.end_ms;
        Ok(())
    }

    /// Put a space after sentence punctuation and collapse repeated spaces
    pub fn normalize_spacing(&mut self) {
        for seg in &mut self.segments {
            seg.text = normalize_spacing(&seg.text);
        }
    }

    /// Original line of every cue keyed by 1-based position
    pub fn to_subtitle_map(&self) -> SubtitleMap {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, seg)| (i + 1, seg.split_text().0.to_string()))
            .collect()
    }

    /// Overwrite cue texts from a map keyed by 1-based position
    pub fn apply_translations(&mut self, translated: &SubtitleMap) -> Result<(), SubtitleError> {
        let len = self.segments.len();
        for (&key, text) in translated {
            let seg = key
                .checked_sub(1)
                .and_then(|idx| self.segments.get_mut(idx))
                .ok_or(SubtitleError::SegmentIndex { start: key, end: key, len })?;
            seg.text = text.clone();
        }
        Ok(())
    }

    /// Parse SRT content; multi-line cue text is joined with spaces
    pub fn parse_srt_string(content: &str) -> Result<Self, SubtitleError> {
        let mut segments = Vec::new();
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text: Vec<&str> = Vec::new();
        let mut expecting_index = true;

        let flush = |times: Option<(u64, u64)>, text: &mut Vec<&str>, out: &mut Vec<Segment>| {
            if let Some((start, end)) = times {
                if text.is_empty() {
                    warn!("Skipping empty subtitle entry at {}", format_timestamp(start));
                } else {
                    out.push(Segment::new(text.join(" "), start, end));
                }
            }
            text.clear();
        };

        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if trimmed.is_empty() {
                if current_times.is_some() {
                    flush(current_times.take(), &mut current_text, &mut segments);
                    expecting_index = true;
                }
                continue;
            }

            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                if current_times.is_some() {
                    flush(current_times.take(), &mut current_text, &mut segments);
                }
                let start = captures_to_ms(&caps, 1);
                let end = captures_to_ms(&caps, 5);
                current_times = Some((start, end));
                expecting_index = false;
                continue;
            }

            if expecting_index && trimmed.parse::<usize>().is_ok() {
                continue;
            }

            if current_times.is_some() {
                current_text.push(trimmed);
            } else {
                warn!("Unexpected text at line {} before timestamp: {}", line_no + 1, trimmed);
            }
        }
        flush(current_times.take(), &mut current_text, &mut segments);

        if segments.is_empty() {
            return Err(SubtitleError::Parse("No valid subtitle entries were found in the SRT content".to_string()));
        }

        Ok(Self::new(segments))
    }

    /// Parse JSON input: either an array of `{text, start_ms, end_ms}` units
    /// or the keyed export written by [`CueSequence::to_json`]
    pub fn from_json_str(content: &str) -> Result<Self, SubtitleError> {
        let value: Value = serde_json::from_str(content).map_err(|e| SubtitleError::Parse(e.to_string()))?;

        match value {
            Value::Array(_) => {
                let units: Vec<Segment> =
                    serde_json::from_value(value).map_err(|e| SubtitleError::Parse(e.to_string()))?;
                Ok(Self::new(units))
            }
            Value::Object(map) => {
                let mut keyed = Vec::with_capacity(map.len());
                for (key, entry) in map {
                    let index: usize = key
                        .parse()
                        .map_err(|_| SubtitleError::Parse(format!("Invalid cue key: {}", key)))?;
                    let exported: ExportedCue =
                        serde_json::from_value(entry).map_err(|e| SubtitleError::Parse(e.to_string()))?;
                    keyed.push((index, exported.into_segment()));
                }
                keyed.sort_by_key(|(index, _)| *index);
                Ok(Self::new(keyed.into_iter().map(|(_, seg)| seg).collect()))
            }
            _ => Err(SubtitleError::Parse("Expected a JSON array or object".to_string())),
        }
    }

    /// Load cues from an `.srt` or `.json` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
        let cues = match ext.as_str() {
            "srt" => Self::parse_srt_string(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(SubtitleError::UnsupportedFormat(other.to_string()).into()),
        };
        Ok(cues)
    }

    pub fn to_srt(&self, layout: Layout) -> String {
        formats::render_srt(&self.segments, layout)
    }

    pub fn to_txt(&self, layout: Layout) -> String {
        formats::render_txt(&self.segments, layout)
    }

    pub fn to_lrc(&self, layout: Layout) -> String {
        formats::render_lrc(&self.segments, layout)
    }

    pub fn to_ass(&self, layout: Layout, styles: &AssStyleSheet) -> String {
        formats::ass::render_ass(&self.segments, layout, styles)
    }

    pub fn to_json(&self) -> Value {
        formats::render_json(&self.segments)
    }

    /// Serialize in the given format
    pub fn render(&self, format: OutputFormat, layout: Layout, styles: &AssStyleSheet) -> Result<String> {
        Ok(match format {
            OutputFormat::Srt => self.to_srt(layout),
            OutputFormat::Txt => self.to_txt(layout),
            OutputFormat::Lrc => self.to_lrc(layout),
            OutputFormat::Ass => self.to_ass(layout, styles),
            OutputFormat::Json => serde_json::to_string(&self.to_json())?,
        })
    }

    /// Write to `path`, picking the format from its extension
    pub fn save<P: AsRef<Path>>(&self, path: P, layout: Layout, styles: &AssStyleSheet) -> Result<()> {
        let path = path.as_ref();
        let ext = path.extension().map(|e| e.to_string_lossy().to_string()).unwrap_or_default();
        let format: OutputFormat = ext.parse().map_err(|_| SubtitleError::UnsupportedFormat(ext.clone()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = self.render(format, layout, styles)?;
        fs::write(path, content).with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;
        Ok(())
    }
}

impl fmt::Display for CueSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_txt(Layout::OriginalOnTop))
    }
}

impl<'a> IntoIterator for &'a CueSequence {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[derive(Deserialize)]
struct ExportedCue {
    start_time: u64,
    end_time: u64,
    original_subtitle: String,
    #[serde(default)]
    translated_subtitle: String,
}

impl ExportedCue {
    fn into_segment(self) -> Segment {
        let text = if self.translated_subtitle.is_empty() {
            self.original_subtitle
        } else {
            format!("{}\n{}", self.original_subtitle, self.translated_subtitle)
        };
        Segment::new(text, self.start_time, self.end_time)
    }
}

fn captures_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
    let field = |i: usize| caps.get(start_idx + i).map_or(0, |m| m.as_str().parse::<u64>().unwrap_or(0));
    (field(0) * 3600 + field(1) * 60 + field(2)) * 1000 + field(3)
}

/// Add a space after punctuation that is directly followed by text, then
/// collapse runs of spaces
pub fn normalize_spacing(text: &str) -> String {
    let trimmed = text.trim();
    let mut spaced = String::with_capacity(trimmed.len() + 8);
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        spaced.push(c);
        if SPACED_PUNCTUATION.contains(&c) {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    spaced.push(' ');
                }
            }
        }
    }

    MULTI_SPACE_REGEX.replace_all(&spaced, " ").into_owned()
}
