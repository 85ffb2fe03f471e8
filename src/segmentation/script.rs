// @module: Script detection and word counting for mixed-language text

/// Ranges counted as one word per character
const CHAR_WORD_RANGES: &[(char, char)] = &[
    ('\u{4e00}', '\u{9fff}'), // CJK unified ideographs
    ('\u{3040}', '\u{309f}'), // Hiragana
    ('\u{30a0}', '\u{30ff}'), // Katakana
    ('\u{ac00}', '\u{d7af}'), // Hangul syllables
    ('\u{0e00}', '\u{0e7f}'), // Thai
    ('\u{0600}', '\u{06ff}'), // Arabic
    ('\u{0590}', '\u{05ff}'), // Hebrew
    ('\u{1e00}', '\u{1eff}'), // Latin extended additional (Vietnamese)
    ('\u{3130}', '\u{318f}'), // Hangul compatibility jamo
];

/// Ranges that make text "CJK" for threshold selection
const CJK_RANGES: &[(char, char)] = &[
    ('\u{4e00}', '\u{9fff}'),
    ('\u{3040}', '\u{309f}'),
    ('\u{30a0}', '\u{30ff}'),
    ('\u{ac00}', '\u{d7af}'),
];

/// Share of CJK characters above which segmentation treats text as CJK
pub const SEGMENT_CJK_RATIO: f64 = 0.5;

fn in_ranges(c: char, ranges: &[(char, char)]) -> bool {
    ranges.iter().any(|&(lo, hi)| c >= lo && c <= hi)
}

// @returns: True when the char lies in a CJK/Kana/Hangul block
pub fn is_cjk_char(c: char) -> bool {
    in_ranges(c, CJK_RANGES)
}

/// Count words in mixed-script text.
///
/// Every character of a character-based script counts as one word; whatever
/// remains is split on whitespace.
pub fn count_words(text: &str) -> usize {
    let mut char_words = 0;
    let mut remaining = String::with_capacity(text.len());

    for c in text.chars() {
        if in_ranges(c, CHAR_WORD_RANGES) {
            char_words += 1;
            remaining.push(' ');
        } else {
            remaining.push(c);
        }
    }

    char_words + remaining.split_whitespace().count()
}

/// Fraction of non-whitespace characters that are CJK
pub fn cjk_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut cjk = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_cjk_char(c) {
            cjk += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        cjk as f64 / total as f64
    }
}

// @returns: True when the CJK share strictly exceeds `threshold`
pub fn is_mainly_cjk(text: &str, threshold: f64) -> bool {
    cjk_ratio(text) > threshold
}

/// True when the text carries no word character at all
pub fn is_pure_punctuation(text: &str) -> bool {
    !text.chars().any(|c| c.is_alphanumeric() || c == '_')
}
