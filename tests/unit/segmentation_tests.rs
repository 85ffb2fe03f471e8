/*!
 * Tests for grouping word units into cues
 */

use cuesmith::app_config::SegmentationConfig;
use cuesmith::segmentation::Segmentor;
use cuesmith::segmentation::script::count_words;
use cuesmith::subtitle_processor::{CueSequence, Segment};

use crate::common;

fn units(words: &[(&str, u64, u64)]) -> CueSequence {
    CueSequence::new(words.iter().map(|(t, s, e)| Segment::new(*t, *s, *e)).collect())
}

/// Evenly spaced units: 300ms each, 100ms apart
fn even_units(tokens: &[&str]) -> CueSequence {
    CueSequence::new(
        tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Segment::new(*t, i as u64 * 400, i as u64 * 400 + 300))
            .collect(),
    )
}

#[test]
fn test_segment_withLongPause_shouldCloseCue() {
    let cues = Segmentor::default().segment(units(&common::two_clause_words()));

    assert_eq!(cues.len(), 2);
    assert_eq!(cues.segments()[0], Segment::new("hello world this is cuesmith", 0, 1800));
    assert_eq!(cues.segments()[1], Segment::new("second cue here", 5000, 6300));
}

#[test]
fn test_segment_withLongLatinClause_shouldRespectWordBudget() {
    let tokens: Vec<String> = (1..=23).map(|i| format!("word{}", i)).collect();
    let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let cues = Segmentor::default().segment(even_units(&refs));

    assert!(cues.len() >= 3);
    for cue in cues.iter() {
        assert!(count_words(&cue.text) <= 10, "cue too long: {}", cue.text);
    }
    let rejoined: Vec<String> = cues.iter().map(|c| c.text.clone()).collect();
    assert_eq!(rejoined.join(" "), refs.join(" "));
}

#[test]
fn test_segment_withCjkCharacters_shouldUseCjkBudget() {
    let text = "今天我们来聊一聊这个非常有意思的话题然后再看看结果";
    let chars: Vec<String> = text.chars().map(|c| c.to_string()).collect();
    let refs: Vec<&str> = chars.iter().map(String::as_str).collect();
    let cues = Segmentor::default().segment(even_units(&refs));

    assert!(cues.len() >= 2);
    for cue in cues.iter() {
        assert!(count_words(&cue.text) <= 15, "cue too long: {}", cue.text);
    }
    let rejoined: String = cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined, text);
}

#[test]
fn test_segment_shouldKeepCuesOrderedAndWithinUnitSpan() {
    let cues = Segmentor::default().segment(units(&common::two_clause_words()));
    let segments = cues.segments();
    for pair in segments.windows(2) {
        assert!(pair[0].start_ms <= pair[1].start_ms);
        assert!(pair[0].end_ms <= pair[1].start_ms);
    }
    assert_eq!(segments.first().map(|s| s.start_ms), Some(0));
    assert_eq!(segments.last().map(|s| s.end_ms), Some(6300));
}

#[test]
fn test_segment_withPunctuationUnits_shouldDropThem() {
    let cues = Segmentor::default().segment(units(&[
        ("Yes", 0, 200),
        (",", 200, 210),
        ("indeed", 300, 600),
        ("!", 600, 610),
    ]));
    assert_eq!(cues.len(), 1);
    assert_eq!(cues.segments()[0].text, "yes indeed");
}

#[test]
fn test_segment_withPhraseLevelInput_shouldResplitIntoWords() {
    let phrases = units(&[
        ("This sentence is delivered as a single phrase", 0, 4000),
        ("and so is this other one", 8000, 10000),
    ]);
    assert!(!phrases.is_word_timestamp());

    let cues = Segmentor::default().segment(phrases);
    assert_eq!(cues.len(), 2);
    assert_eq!(cues.segments()[0].start_ms, 0);
    // durations are spread per phoneme and rounded down
    assert!(cues.segments()[1].end_ms > 9900 && cues.segments()[1].end_ms <= 10000);
    assert_eq!(cues.segments()[1].text, "and so is this other one");
}

#[test]
fn test_segment_withTighterGap_shouldSplitMore() {
    let config = SegmentationConfig {
        max_gap_ms: 50,
        ..SegmentationConfig::default()
    };
    let cues = Segmentor::new(&config).segment(units(&common::two_clause_words()));
    assert_eq!(cues.len(), 8);
}

#[test]
fn test_segment_withEmptyInput_shouldReturnEmpty() {
    assert!(Segmentor::default().segment(CueSequence::default()).is_empty());
}
