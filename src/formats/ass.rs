/*!
 * Advanced SubStation Alpha output.
 *
 * Two named styles are written: `Default` for the main line and `Secondary`
 * for the companion line of two-line layouts.
 */

use serde::{Deserialize, Serialize};

use super::Layout;
use crate::subtitle_processor::Segment;

const STYLE_FORMAT: &str = "Format: Name,Fontname,Fontsize,PrimaryColour,SecondaryColour,OutlineColour,BackColour,\
Bold,Italic,Underline,StrikeOut,ScaleX,ScaleY,Spacing,Angle,BorderStyle,Outline,Shadow,\
Alignment,MarginL,MarginR,MarginV,Encoding";

/// One `[V4+ Styles]` entry; colours are given as `#BBGGRR`-style hex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssFontStyle {
    pub name: String,
    pub fontname: String,
    pub fontsize: u32,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: i32,
    pub italic: i32,
    pub underline: i32,
    pub strike_out: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub spacing: f32,
    pub angle: f32,
    pub border_style: i32,
    pub outline: f32,
    pub shadow: f32,
    pub alignment: i32,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub encoding: i32,
}

impl AssFontStyle {
    fn with_name_and_size(name: &str, fontsize: u32) -> Self {
        Self {
            name: name.to_string(),
            fontname: "MicrosoftYaHei-Bold".to_string(),
            fontsize,
            primary_colour: "#FFFFFF".to_string(),
            secondary_colour: "#0000FF".to_string(),
            outline_colour: "#000000".to_string(),
            back_colour: "#000000".to_string(),
            bold: -1,
            italic: 0,
            underline: 0,
            strike_out: 0,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 0.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 15,
            encoding: 1,
        }
    }

    pub fn default_main() -> Self {
        Self::with_name_and_size("Default", 40)
    }

    pub fn default_secondary() -> Self {
        Self::with_name_and_size("Secondary", 30)
    }

    /// Render as a `Style:` line
    pub fn to_style_line(&self) -> String {
        format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name,
            self.fontname,
            self.fontsize,
            read_color(&self.primary_colour),
            read_color(&self.secondary_colour),
            read_color(&self.outline_colour),
            read_color(&self.back_colour),
            self.bold,
            self.italic,
            self.underline,
            self.strike_out,
            self.scale_x,
            self.scale_y,
            self.spacing,
            self.angle,
            self.border_style,
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
            self.encoding,
        )
    }
}

/// `#xxxxxx` becomes `&H00XXXXXX`
pub fn read_color(value: &str) -> String {
    value.trim().replace('#', "&H00").to_uppercase()
}

/// The pair of styles written into `[V4+ Styles]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssStyleSheet {
    #[serde(default = "AssFontStyle::default_main")]
    pub default_style: AssFontStyle,
    #[serde(default = "AssFontStyle::default_secondary")]
    pub secondary_style: AssFontStyle,
}

impl Default for AssStyleSheet {
    fn default() -> Self {
        Self {
            default_style: AssFontStyle::default_main(),
            secondary_style: AssFontStyle::default_secondary(),
        }
    }
}

impl AssStyleSheet {
    pub fn to_section(&self) -> String {
        format!(
            "[V4+ Styles]\n{}\n{}\n{}",
            STYLE_FORMAT,
            self.default_style.to_style_line(),
            self.secondary_style.to_style_line()
        )
    }
}

fn dialogue(out: &mut String, start: &str, end: &str, style: &str, text: &str) {
    out.push_str(&format!("Dialogue: 0,{},{},{},,0,0,0,,{}\n", start, end, style, text));
}

/// Render a full ASS document
pub fn render_ass(segments: &[Segment], layout: Layout, styles: &AssStyleSheet) -> String {
    let mut out = String::new();
    out.push_str("[Script Info]\n");
    out.push_str("; Script generated by cuesmith\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str("PlayResX: 1280\n");
    out.push_str("PlayResY: 720\n\n");
    out.push_str(&styles.to_section());
    out.push_str("\n\n[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for seg in segments {
        let (start, end) = seg.to_ass_timestamps();
        let (original, translated) = seg.split_text();

        if !seg.text.contains('\n') || translated.is_empty() {
            dialogue(&mut out, &start, &end, "Default", original);
            continue;
        }

        // Later events stack above earlier ones, so the companion line goes first
        match layout {
            Layout::TranslatedOnTop => {
                dialogue(&mut out, &start, &end, "Secondary", original);
                dialogue(&mut out, &start, &end, "Default", translated);
            }
            Layout::OriginalOnTop => {
                dialogue(&mut out, &start, &end, "Secondary", translated);
                dialogue(&mut out, &start, &end, "Default", original);
            }
            Layout::OriginalOnly => dialogue(&mut out, &start, &end, "Default", original),
            Layout::TranslatedOnly => dialogue(&mut out, &start, &end, "Default", translated),
        }
    }

    out
}
