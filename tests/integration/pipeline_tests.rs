/*!
 * End-to-end tests through the library: load, segment, translate, save
 */

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cuesmith::app_config::{TranslateMode, TranslationConfig};
use cuesmith::formats::{AssStyleSheet, Layout};
use cuesmith::providers::mock::MockProvider;
use cuesmith::segmentation::Segmentor;
use cuesmith::subtitle_processor::CueSequence;
use cuesmith::translation::{ProgressCallback, TranslationService};

use crate::common;

fn load_segmented(dir: &std::path::Path) -> Result<CueSequence> {
    let path = common::create_word_json(dir, "talk.json", &common::two_clause_words())?;
    Ok(Segmentor::default().segment(CueSequence::load(&path)?))
}

#[tokio::test]
async fn test_pipeline_withEchoProvider_shouldWriteBilingualSrt() -> Result<()> {
    common::init_test_logging();
    let dir = common::create_temp_dir()?;
    let mut cues = load_segmented(dir.path())?;

    let service = TranslationService::with_provider(TranslationConfig::default(), "en", "fr", Arc::new(MockProvider::echo()))?;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let progress: ProgressCallback = Arc::new(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = service.translate_cues(&mut cues, Some(progress), None).await?;
    assert!(outcome.degraded.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), outcome.attempts);

    let out = dir.path().join("talk.fr.srt");
    cues.save(&out, Layout::TranslatedOnTop, &AssStyleSheet::default())?;
    let written = std::fs::read_to_string(&out)?;
    assert_eq!(
        written,
        "1\n00:00:00,000 --> 00:00:01,800\ntr: hello world this is cuesmith\nhello world this is cuesmith\n\n\
         2\n00:00:05,000 --> 00:00:06,300\ntr: second cue here\nsecond cue here\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withDeepMode_shouldSummarizeThenTranslate() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut cues = load_segmented(dir.path())?;

    let provider = MockProvider::deep_echo();
    let config = TranslationConfig {
        mode: TranslateMode::Deep,
        ..TranslationConfig::default()
    };
    let service = TranslationService::with_provider(config, "en", "fr", Arc::new(provider.clone()))?;

    let outcome = service.translate_cues(&mut cues, None, None).await?;
    assert!(outcome.degraded.is_empty());
    assert_eq!(cues.segments()[1].text, "second cue here\ntr: second cue here");
    // summary request plus one batch
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withCancelledRun_shouldKeepEveryCue() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut cues = load_segmented(dir.path())?;
    let before = cues.len();

    let service = TranslationService::with_provider(TranslationConfig::default(), "en", "fr", Arc::new(MockProvider::echo()))?;
    let outcome = service
        .translate_cues(&mut cues, None, Some(Arc::new(AtomicBool::new(true))))
        .await?;

    assert_eq!(outcome.degraded.len(), before);
    assert_eq!(cues.len(), before);
    assert_eq!(cues.segments()[0].text, "hello world this is cuesmith\nhello world this is cuesmith");
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withTranslationDisabled_shouldLeaveCuesUntouched() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut cues = load_segmented(dir.path())?;
    let snapshot = cues.clone();

    let config = TranslationConfig {
        need_translate: false,
        ..TranslationConfig::default()
    };
    let provider = MockProvider::echo();
    let service = TranslationService::with_provider(config, "en", "fr", Arc::new(provider.clone()))?;
    service.translate_cues(&mut cues, None, None).await?;

    assert_eq!(cues, snapshot);
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[test]
fn test_summarize_withPlainAnswer_shouldReturnTrimmedText() -> Result<()> {
    let service = TranslationService::with_provider(
        TranslationConfig::default(),
        "en",
        "fr",
        Arc::new(MockProvider::echo()),
    )?;
    let summary = tokio_test::block_on(service.summarize("a talk about subtitles"));
    assert_eq!(summary, cuesmith::providers::mock::MOCK_PLAIN_ANSWER);
    Ok(())
}
