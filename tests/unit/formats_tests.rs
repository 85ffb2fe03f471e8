/*!
 * Tests for cue serializations and bilingual layouts
 */

use anyhow::Result;
use cuesmith::formats::{AssStyleSheet, Layout, OutputFormat};
use cuesmith::subtitle_processor::{CueSequence, Segment};

use crate::common;

fn bilingual() -> CueSequence {
    CueSequence::new(vec![
        Segment::new("hello there\nbonjour", 0, 1500),
        Segment::new("untranslated", 2000, 3250),
    ])
}

#[test]
fn test_to_srt_withEachLayout_shouldArrangeLines() {
    let cues = bilingual();

    assert_eq!(
        cues.to_srt(Layout::OriginalOnTop),
        "1\n00:00:00,000 --> 00:00:01,500\nhello there\nbonjour\n\n2\n00:00:02,000 --> 00:00:03,250\nuntranslated\n"
    );
    assert!(cues.to_srt(Layout::TranslatedOnTop).contains("bonjour\nhello there\n"));
    assert!(cues.to_srt(Layout::TranslatedOnly).contains("00:00:01,500\nbonjour\n"));
    assert!(cues.to_srt(Layout::OriginalOnly).contains("00:00:01,500\nhello there\n"));
    // a cue without a translation shows its original in every layout
    assert!(cues.to_srt(Layout::TranslatedOnly).contains("00:00:03,250\nuntranslated\n"));
}

#[test]
fn test_to_txt_and_lrc_shouldFlattenPerCue() {
    let cues = bilingual();
    assert_eq!(cues.to_txt(Layout::OriginalOnly), "hello there\nuntranslated");
    assert_eq!(
        cues.to_lrc(Layout::OriginalOnTop),
        "[00:00.00]hello there bonjour\n[00:02.00]untranslated"
    );
}

#[test]
fn test_to_ass_withOriginalOnTop_shouldStackStyles() {
    let ass = bilingual().to_ass(Layout::OriginalOnTop, &AssStyleSheet::default());

    assert!(ass.starts_with("[Script Info]"));
    assert!(ass.contains("[V4+ Styles]"));
    assert!(ass.contains("Dialogue: 0,0:00:00.00,0:00:01.50,Secondary,,0,0,0,,bonjour\n"));
    assert!(ass.contains("Dialogue: 0,0:00:00.00,0:00:01.50,Default,,0,0,0,,hello there\n"));
    assert!(ass.contains("Dialogue: 0,0:00:02.00,0:00:03.25,Default,,0,0,0,,untranslated\n"));
}

#[test]
fn test_to_json_shouldExportKeyedCues() {
    let value = bilingual().to_json();
    assert_eq!(value["1"]["start_time"], 0);
    assert_eq!(value["1"]["end_time"], 1500);
    assert_eq!(value["1"]["original_subtitle"], "hello there");
    assert_eq!(value["1"]["translated_subtitle"], "bonjour");
    assert_eq!(value["2"]["original_subtitle"], "untranslated");
}

#[test]
fn test_save_withExtension_shouldPickFormat() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let cues = bilingual();
    let styles = AssStyleSheet::default();

    for format in [OutputFormat::Srt, OutputFormat::Txt, OutputFormat::Lrc, OutputFormat::Ass, OutputFormat::Json] {
        let path = dir.path().join(format!("out.{}", format.extension()));
        cues.save(&path, Layout::OriginalOnTop, &styles)?;
        let written = std::fs::read_to_string(&path)?;
        assert_eq!(written, cues.render(format, Layout::OriginalOnTop, &styles)?);
    }

    assert!(cues.save(dir.path().join("out.vtt"), Layout::OriginalOnTop, &styles).is_err());
    Ok(())
}

#[test]
fn test_load_withSrt_shouldParseCues() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_word_srt(dir.path(), "words.srt", &common::two_clause_words())?;

    let cues = CueSequence::load(&path)?;
    assert_eq!(cues.len(), 8);
    assert_eq!(cues.segments()[4], Segment::new("cuesmith", 1300, 1800));
    assert!(cues.is_word_timestamp());
    Ok(())
}

#[test]
fn test_layout_and_format_from_str_shouldAcceptCliSpellings() {
    assert_eq!("original_only".parse::<Layout>().unwrap(), Layout::OriginalOnly);
    assert_eq!("Translated-On-Top".parse::<Layout>().unwrap(), Layout::TranslatedOnTop);
    assert!("side-by-side".parse::<Layout>().is_err());
    assert_eq!(".ass".parse::<OutputFormat>().unwrap(), OutputFormat::Ass);
    assert!("vtt".parse::<OutputFormat>().is_err());
}
