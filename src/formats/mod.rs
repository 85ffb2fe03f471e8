/*!
 * Text serializations of a cue sequence.
 *
 * Every format renders bilingual cues (`"<original>\n<translated>"`) through a
 * [`Layout`]; ASS lives in its own submodule because of its style sheet.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::subtitle_processor::Segment;

pub mod ass;

pub use self::ass::{AssFontStyle, AssStyleSheet};

/// How original and translated lines are arranged in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    OriginalOnTop,
    TranslatedOnTop,
    OriginalOnly,
    TranslatedOnly,
}

impl Layout {
    /// Arrange one cue's text
    pub fn arrange(&self, segment: &Segment) -> String {
        let (original, translated) = segment.split_text();
        match self {
            Self::OriginalOnTop if !translated.is_empty() => format!("{}\n{}", original, translated),
            Self::TranslatedOnTop if !translated.is_empty() => format!("{}\n{}", translated, original),
            Self::TranslatedOnly if !translated.is_empty() => translated.to_string(),
            _ => original.to_string(),
        }
    }
}

impl FromStr for Layout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "original-on-top" => Ok(Self::OriginalOnTop),
            "translated-on-top" => Ok(Self::TranslatedOnTop),
            "original-only" => Ok(Self::OriginalOnly),
            "translated-only" => Ok(Self::TranslatedOnly),
            _ => Err(anyhow!("Invalid layout: {}", s)),
        }
    }
}

/// Output file formats, keyed by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Srt,
    Txt,
    Lrc,
    Ass,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Txt => "txt",
            Self::Lrc => "lrc",
            Self::Ass => "ass",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "txt" => Ok(Self::Txt),
            "lrc" => Ok(Self::Lrc),
            "ass" => Ok(Self::Ass),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Unsupported output format: {}", s)),
        }
    }
}

/// `index\nHH:MM:SS,mmm --> HH:MM:SS,mmm\ntext\n` per cue, cues joined by a newline
pub fn render_srt(segments: &[Segment], layout: Layout) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| format!("{}\n{}\n{}\n", i + 1, seg.to_srt_timestamp(), layout.arrange(seg)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_txt(segments: &[Segment], layout: Layout) -> String {
    segments.iter().map(|seg| layout.arrange(seg)).collect::<Vec<_>>().join("\n")
}

/// One `[MM:SS.cc]text` line per cue; two-line layouts are joined with a space
pub fn render_lrc(segments: &[Segment], layout: Layout) -> String {
    segments
        .iter()
        .map(|seg| format!("{}{}", seg.to_lrc_timestamp(), layout.arrange(seg).replace('\n', " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keyed export: `{"1": {start_time, end_time, original_subtitle, translated_subtitle}}`
pub fn render_json(segments: &[Segment]) -> Value {
    let mut map = Map::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        let (original, translated) = seg.split_text();
        map.insert(
            (i + 1).to_string(),
            json!({
                "start_time": seg.start_ms,
                "end_time": seg.end_ms,
                "original_subtitle": original,
                "translated_subtitle": translated,
            }),
        );
    }
    Value::Object(map)
}
