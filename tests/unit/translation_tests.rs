/*!
 * Tests for batching, alignment, repair and the translation retry loop
 */

use std::sync::Arc;

use cuesmith::app_config::{TranslateMode, TranslationConfig};
use cuesmith::providers::mock::{MockBehavior, MockProvider};
use cuesmith::translation::{
    align_sequences, group_subtitles, repair_restatement, similarity_ratio, Batch, Orchestrator, RestatedLine,
    TranslationService,
};

use crate::common;

fn service(provider: MockProvider, mode: TranslateMode) -> TranslationService {
    let config = TranslationConfig {
        mode,
        ..TranslationConfig::default()
    };
    TranslationService::with_provider(config, "en", "fr", Arc::new(provider)).unwrap()
}

#[test]
fn test_group_subtitles_withOverlap_shouldPrependPreviousTail() {
    let batches = group_subtitles(&common::numbered_map(10), 4, 2);
    let keys: Vec<Vec<usize>> = batches.iter().map(|b| b.entries.keys().copied().collect()).collect();

    assert_eq!(keys, vec![vec![1, 2, 3, 4], vec![3, 4, 5, 6, 7, 8], vec![7, 8, 9, 10]]);
    let new_keys: Vec<usize> = batches.iter().flat_map(|b| b.new_keys().collect::<Vec<_>>()).collect();
    assert_eq!(new_keys, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_group_subtitles_withoutOverlap_shouldPartition() {
    let batches = group_subtitles(&common::numbered_map(5), 2, 0);
    let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(batches.iter().all(|b| b.context_len == 0));
}

#[test]
fn test_align_sequences_withRestatedLines_shouldKeepSourceCardinality() {
    let source = ["ab", "b", "c", "d", "e", "f", "g", "h", "i"];
    let target = ["a", "b", "c", "d", "f", "g", "h", "i"];

    let pair = align_sequences(&source, &target);
    assert_eq!(pair.len(), source.len());
    assert_eq!(pair.target, vec!["a", "b", "c", "d", "d", "f", "g", "h", "i"]);
}

#[test]
fn test_similarity_ratio_shouldMatchCommonSubsequenceShare() {
    assert_eq!(similarity_ratio("", ""), 1.0);
    assert_eq!(similarity_ratio("abc", ""), 0.0);
    assert!((similarity_ratio("abc", "abd") - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_repair_restatement_withFaithfulLines_shouldKeyFromStartId() {
    let batch = Batch::new((21..=23).map(|i| (i, format!("source line {}", i))).collect(), 0);
    let restated = vec![
        RestatedLine::new("source line 21", "ligne 21"),
        RestatedLine::new("source line 22", "ligne 22"),
        RestatedLine::new("source line 23", "ligne 23"),
    ];

    let repaired = repair_restatement(&batch, &restated).unwrap();
    assert_eq!(repaired.keys().copied().collect::<Vec<_>>(), vec![21, 22, 23]);
    assert_eq!(repaired[&22], ("source line 22".to_string(), "ligne 22".to_string()));
}

#[tokio::test]
async fn test_translate_map_withOversizedBatch_shouldRechunkAndSucceed() {
    let provider = MockProvider::new(MockBehavior::FailAboveBatch { max_entries: 6 });
    let service = service(provider, TranslateMode::Precise);

    let outcome = service
        .translate_map(&common::numbered_map(10), "", &Orchestrator::new(10, 2))
        .await;

    assert!(outcome.degraded.is_empty());
    assert_eq!(outcome.entries.len(), 10);
    assert_eq!(outcome.entries[&5], "line 5\ntr: line 5");
    // one failed full batch, then three re-chunked batches
    assert_eq!(outcome.attempts, 4);
}

#[tokio::test]
async fn test_translate_map_withBatchThatNeverFits_shouldDegradeOnlyItsNewKeys() {
    let provider = MockProvider::new(MockBehavior::FailAboveBatch { max_entries: 5 });
    let service = service(provider, TranslateMode::Precise);

    let outcome = service
        .translate_map(&common::numbered_map(10), "", &Orchestrator::new(10, 2).with_max_rounds(3))
        .await;

    assert_eq!(outcome.rounds, 3);
    assert_eq!(outcome.degraded, vec![5, 6]);
    assert_eq!(outcome.entries.len(), 10);
    assert_eq!(outcome.entries[&5], "line 5\nline 5");
    assert_eq!(outcome.entries[&4], "line 4\ntr: line 4");
    assert_eq!(outcome.entries[&8], "line 8\ntr: line 8");
}

#[tokio::test]
async fn test_translate_map_withDeadProvider_shouldFallBackVerbatim() {
    let provider = MockProvider::failing();
    let service = service(provider.clone(), TranslateMode::Fast);

    let outcome = service
        .translate_map(&common::numbered_map(3), "", &Orchestrator::new(40, 2).with_max_rounds(2))
        .await;

    assert_eq!(outcome.degraded, vec![1, 2, 3]);
    assert_eq!(outcome.entries[&2], "line 2\nline 2");
    // round 0: one batch; round 1: its single re-chunked piece; two local attempts each
    assert_eq!(provider.request_count(), 4);
}

#[tokio::test]
async fn test_translate_map_withDefaultBudgetExhausted_shouldCoverEveryKeyVerbatim() {
    let provider = MockProvider::failing();
    let service = service(provider.clone(), TranslateMode::Fast);
    let subtitles = common::numbered_map(25);

    let outcome = service
        .translate_map(&subtitles, "", &Orchestrator::from_config(&TranslationConfig::default()))
        .await;

    assert_eq!(outcome.rounds, 40);
    assert_eq!(outcome.degraded, (1..=25).collect::<Vec<_>>());
    assert_eq!(outcome.entries.keys().copied().collect::<Vec<_>>(), (1..=25).collect::<Vec<_>>());
    for (key, original) in &subtitles {
        assert_eq!(outcome.entries[key], format!("{}\n{}", original, original));
    }
    // one full batch, then seven pieces of four for 39 rounds, two attempts each
    assert_eq!(provider.request_count(), 2 + 39 * 7 * 2);
}

#[tokio::test]
async fn test_translate_map_withIntermittentProvider_shouldRecoverLocally() {
    let service = service(MockProvider::intermittent(2), TranslateMode::Precise);

    let outcome = service
        .translate_map(&common::numbered_map(10), "", &Orchestrator::new(4, 2))
        .await;

    assert!(outcome.degraded.is_empty());
    assert_eq!(outcome.rounds, 1);
    assert_eq!(outcome.entries[&10], "line 10\ntr: line 10");
}

#[tokio::test]
async fn test_translate_map_withDriftingRestatement_shouldRetryDeepBatch() {
    let drifted = r#"{"1": {"optimized_subtitle": "zzz", "revised_translation": "x"},
                      "2": {"optimized_subtitle": "qqq", "revised_translation": "y"}}"#;
    let faithful = r#"{"1": {"optimized_subtitle": "line 1", "revised_translation": "ligne 1"},
                       "2": {"optimized_subtitle": "line 2", "revised_translation": "ligne 2"}}"#;
    let provider = MockProvider::scripted([drifted, faithful]);
    let service = service(provider.clone(), TranslateMode::Deep);

    let outcome = service
        .translate_map(&common::numbered_map(2), "notes", &Orchestrator::default())
        .await;

    assert!(outcome.degraded.is_empty());
    assert_eq!(outcome.entries[&1], "line 1\nligne 1");
    assert_eq!(outcome.entries[&2], "line 2\nligne 2");
    assert_eq!(provider.request_count(), 2);
}
