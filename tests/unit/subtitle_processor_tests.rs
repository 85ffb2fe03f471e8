/*!
 * Tests for cue sequence construction and merging
 */

use cuesmith::errors::SubtitleError;
use cuesmith::subtitle_processor::{CueSequence, Segment};

fn three_cues() -> CueSequence {
    CueSequence::new(vec![
        Segment::new("one", 0, 1000),
        Segment::new("two", 1000, 2000),
        Segment::new("three", 2000, 3000),
    ])
}

fn texts(cues: &CueSequence) -> Vec<(&str, u64)> {
    cues.iter().map(|s| (s.text.as_str(), s.start_ms)).collect()
}

#[test]
fn test_new_withUnsortedBlankCues_shouldDropBlanksAndSortStably() {
    let cues = CueSequence::new(vec![
        Segment::new("c", 3000, 3500),
        Segment::new("", 500, 600),
        Segment::new("a", 1000, 1200),
        Segment::new("  \t\n", 200, 300),
        Segment::new("b", 1000, 1100),
    ]);

    assert_eq!(texts(&cues), vec![("a", 1000), ("b", 1000), ("c", 3000)]);
}

#[test]
fn test_merge_segments_withValidRange_shouldSpanFirstToLast() {
    let mut cues = three_cues();
    cues.merge_segments(0, 1, Some("one two")).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues.segments()[0], Segment::new("one two", 0, 2000));
    assert_eq!(cues.segments()[1].text, "three");
}

#[test]
fn test_merge_segments_withBadIndices_shouldReturnSegmentIndex() {
    let mut cues = three_cues();

    let inverted = cues.merge_segments(2, 1, None);
    assert!(matches!(inverted, Err(SubtitleError::SegmentIndex { start: 2, end: 1, len: 3 })));

    let past_end = cues.merge_segments(0, 3, None);
    assert!(matches!(past_end, Err(SubtitleError::SegmentIndex { start: 0, end: 3, len: 3 })));

    assert_eq!(cues, three_cues());
}

#[test]
fn test_merge_with_next_shouldJoinWithSpace() {
    let mut cues = three_cues();
    cues.merge_with_next(1).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues.segments()[1], Segment::new("two three", 1000, 3000));
}

#[test]
fn test_merge_with_next_withLastOrHugeIndex_shouldReturnSegmentIndex() {
    let mut cues = three_cues();

    assert!(matches!(cues.merge_with_next(2), Err(SubtitleError::SegmentIndex { len: 3, .. })));
    assert!(matches!(
        cues.merge_with_next(usize::MAX),
        Err(SubtitleError::SegmentIndex { start: usize::MAX, len: 3, .. })
    ));

    let mut empty = CueSequence::default();
    assert!(matches!(empty.merge_with_next(0), Err(SubtitleError::SegmentIndex { len: 0, .. })));
    assert_eq!(cues, three_cues());
}
