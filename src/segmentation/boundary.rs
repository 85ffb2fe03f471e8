/*!
 * Lexical boundary refinement.
 *
 * Long clause groups are cut before connector words (articles, conjunctions,
 * prepositions, pronouns) and after closing words (punctuation, possessives,
 * sentence-final particles), as long as the piece being closed is already
 * reasonably long.
 */

use log::debug;

use super::script::{is_mainly_cjk, SEGMENT_CJK_RATIO};
use crate::subtitle_processor::Segment;

/// Words a new piece may start with
pub const PREFIX_SPLIT_WORDS: &[&str] = &[
    // articles
    "a", "an", "the",
    // conjunctions and discourse connectives
    "and", "or", "but", "if", "then", "because", "as", "until", "while", "when", "where", "nor", "yet", "so",
    "for", "however", "moreover", "furthermore", "therefore", "thus", "although", "though", "nevertheless",
    "meanwhile", "consequently", "additionally", "besides", "instead", "unless", "since", "before", "after",
    "during", "within", "without", "up", "down", "out", "off", "into", "onto", "upon", "toward", "against",
    "near", "inside", "outside", "across", "around", "behind", "beyond", "beside", "beneath", "except",
    // pronouns
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
    "my", "your", "his", "its", "our", "their", "that", "this", "these", "those",
    "what", "who", "whom", "whose", "which", "why", "how",
    // prepositions
    "in", "on", "at", "to", "with", "by", "from", "about", "above", "below", "under", "over", "through",
    "between", "among",
    // Chinese conjunctions and pronouns
    "和", "及", "与", "但", "而", "或", "因",
    "我", "你", "他", "她", "它", "咱", "您", "这", "那", "哪",
];

/// Words a piece may end with
pub const SUFFIX_SPLIT_WORDS: &[&str] = &[
    ".", ",", "!", "?", "。", "，", "！", "？",
    "mine", "yours", "his", "hers", "its", "ours", "theirs",
    "too", "either", "neither",
    "的", "了", "着", "过", "吗", "呢", "吧", "啊", "呀", "哦", "哈", "嘛", "啦",
];

#[derive(Debug, Clone)]
pub struct BoundaryRefiner {
    pub max_words_latin: usize,
    pub max_words_cjk: usize,
}

impl Default for BoundaryRefiner {
    fn default() -> Self {
        Self {
            max_words_latin: 10,
            max_words_cjk: 15,
        }
    }
}

impl BoundaryRefiner {
    /// Word budget for a piece of text, by dominant script
    pub fn max_words_for(&self, text: &str) -> usize {
        if is_mainly_cjk(text, SEGMENT_CJK_RATIO) {
            self.max_words_cjk
        } else {
            self.max_words_latin
        }
    }

    /// Split one group at connector boundaries. Never yields empty pieces.
    pub fn refine(&self, group: Vec<Segment>) -> Vec<Vec<Segment>> {
        let mut pieces = Vec::new();
        let mut current: Vec<Segment> = Vec::new();

        for token in group {
            let max_words = self.max_words_for(&token.text);
            let lower = token.text.trim().to_lowercase();

            let starts_clause = PREFIX_SPLIT_WORDS.iter().any(|w| lower.starts_with(w));
            if starts_clause && !current.is_empty() && current.len() >= max_words * 6 / 10 {
                debug!("Splitting before '{}' after {} tokens", lower, current.len());
                pieces.push(std::mem::take(&mut current));
            }

            current.push(token);

            let ends_clause = SUFFIX_SPLIT_WORDS.iter().any(|w| lower.ends_with(w));
            if ends_clause && current.len() >= max_words * 4 / 10 {
                debug!("Splitting after '{}' at {} tokens", lower, current.len());
                pieces.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }
}
