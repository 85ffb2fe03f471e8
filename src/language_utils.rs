/*!
 * Language utilities and prompt lookup tables
 *
 * ISO 639 code handling is backed by `isolang`; the descriptive tables feed
 * the placeholders of the translation prompts.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// One row of a lookup table: display name, stable code, prompt description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub name: &'static str,
    pub code: &'static str,
    pub description: &'static str,
}

const fn entry(name: &'static str, code: &'static str, description: &'static str) -> TableEntry {
    TableEntry { name, code, description }
}

/// Spoken languages accepted as a translation source
pub static AUDIO_LANGUAGES: &[TableEntry] = &[
    entry("Auto", "auto", "unknown"),
    entry("English", "en", "English"),
    entry("Chinese", "zh", "Chinese"),
    entry("Japanese", "ja", "Japanese"),
    entry("Korean", "ko", "Korean"),
    entry("Cantonese", "yue", "Yue"),
    entry("French", "fr", "French"),
    entry("German", "de", "German"),
    entry("Spanish", "es", "Spanish"),
    entry("Russian", "ru", "Russian"),
    entry("Portuguese", "pt", "Portuguese"),
    entry("Turkish", "tr", "Turkish"),
    entry("Italian", "it", "Italian"),
];

/// Regional target variants that a bare ISO code cannot express
pub static TARGET_LANGUAGE_VARIANTS: &[TableEntry] = &[
    entry("Chinese (Simplified)", "zh-hans", "Chinese, Simplified"),
    entry("Chinese (Traditional)", "zh-hant", "Chinese, Traditional"),
    entry("English (US)", "en-us", "American English"),
    entry("English (UK)", "en-gb", "British English"),
    entry("Portuguese (Brazil)", "pt-br", "Brazilian Portuguese"),
    entry("Norwegian", "nb", "Norwegian Bokmål"),
];

pub static AUDIO_TYPES: &[TableEntry] = &[
    entry("Movie", "movie", "movie"),
    entry("Documentary", "documentary", "documentary"),
    entry("Song", "song", "song"),
    entry("Opera", "opera", "opera"),
    entry("Comedy", "comedy", "comedy sketch"),
];

pub static SUBJECT_CONTENT: &[TableEntry] = &[
    entry("Entertainment", "entertainment", "entertainment"),
    entry("Economics", "economic", "economics"),
    entry("Education", "education", "education"),
    entry("Programming", "programming", "software programming"),
    entry("Society", "society", "society"),
    entry("History", "history", "history"),
    entry("Science", "science", "science"),
];

pub static STYLE_LANGUAGE: &[TableEntry] = &[
    entry("Passionate", "passionate", "passionate"),
    entry("Calm", "calm", "calm"),
    entry("Joyful", "joyful", "joyful"),
    entry("Ambiguous", "ambiguous", "ambiguous"),
    entry("Peaceful", "peaceful", "peaceful"),
    entry("Solemn", "solemn", "solemn"),
];

/// Find a row by code, case-insensitively
pub fn lookup(table: &'static [TableEntry], code: &str) -> Option<&'static TableEntry> {
    let code = code.trim();
    table.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}

/// Description used in prompts, falling back to the code itself
pub fn describe(table: &'static [TableEntry], code: &str) -> String {
    lookup(table, code).map_or_else(|| code.to_string(), |e| e.description.to_string())
}

/// Human-readable name of a language code for prompts.
///
/// Regional variants and the source table are consulted before ISO names.
pub fn describe_language(code: &str) -> String {
    if let Some(e) = lookup(TARGET_LANGUAGE_VARIANTS, code).or_else(|| lookup(AUDIO_LANGUAGES, code)) {
        return e.description.to_string();
    }
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// Whether the source language writes without spaces between words.
///
/// Membership test over Chinese, Japanese and Korean in any ISO form.
pub fn is_cjk_only(code: &str) -> bool {
    ["zh", "ja", "ko"].iter().any(|cjk| language_codes_match(code, cjk))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        // ISO 639-2/B codes that differ from 639-2/T
        let part2t = match normalized_code.as_str() {
            "fre" => "fra",
            "ger" => "deu",
            "dut" => "nld",
            "gre" => "ell",
            "chi" => "zho",
            "cze" => "ces",
            "per" => "fas",
            "rum" => "ron",
            "slo" => "slk",
            _ => "",
        };
        if !part2t.is_empty() {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from an ISO code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Validate a source language: ISO code, table entry, or "auto"
pub fn validate_source_language(code: &str) -> Result<()> {
    if lookup(AUDIO_LANGUAGES, code).is_some() || normalize_to_part2t(code).is_ok() {
        Ok(())
    } else {
        Err(anyhow!("Invalid source language code: {}", code))
    }
}

/// Validate a target language: ISO code or regional variant
pub fn validate_target_language(code: &str) -> Result<()> {
    if lookup(TARGET_LANGUAGE_VARIANTS, code).is_some() || normalize_to_part2t(code).is_ok() {
        Ok(())
    } else {
        Err(anyhow!("Invalid target language code: {}", code))
    }
}
