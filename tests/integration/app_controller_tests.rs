/*!
 * Controller runs over single files and folders
 */

use anyhow::Result;
use std::sync::Arc;

use cuesmith::app_config::Config;
use cuesmith::app_controller::{Controller, ISSUES_LOG_NAME};
use cuesmith::formats::OutputFormat;
use cuesmith::providers::mock::{MockBehavior, MockProvider};

use crate::common;

fn controller(config: Config, provider: MockProvider) -> Controller {
    Controller::with_provider(config, Arc::new(provider)).unwrap()
}

#[tokio::test]
async fn test_run_withWordJson_shouldWriteEveryFormat() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_word_json(dir.path(), "talk.json", &common::two_clause_words())?;

    let mut config = common::test_config();
    config.output.formats = vec![OutputFormat::Srt, OutputFormat::Ass, OutputFormat::Json];
    let written = controller(config, MockProvider::echo()).run(input, None, false).await?;

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["talk.fr.srt", "talk.fr.ass", "talk.fr.json"]);

    let srt = std::fs::read_to_string(dir.path().join("talk.fr.srt"))?;
    assert!(srt.contains("hello world this is cuesmith\ntr: hello world this is cuesmith\n"));
    assert!(!dir.path().join(ISSUES_LOG_NAME).exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_word_srt(dir.path(), "talk.srt", &common::two_clause_words())?;
    let existing = common::create_test_file(dir.path(), "talk.fr.srt", "keep me")?;

    let provider = MockProvider::echo();
    let controller = controller(common::test_config(), provider.clone());

    let written = controller.run(input.clone(), None, false).await?;
    assert!(written.is_empty());
    assert_eq!(std::fs::read_to_string(&existing)?, "keep me");
    assert_eq!(provider.request_count(), 0);

    let written = controller.run(input, None, true).await?;
    assert_eq!(written, vec![existing.clone()]);
    assert_ne!(std::fs::read_to_string(&existing)?, "keep me");
    Ok(())
}

#[tokio::test]
async fn test_run_withNoTranslate_shouldWriteOriginalOnlyCues() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_word_json(dir.path(), "talk.json", &common::two_clause_words())?;
    let out_dir = dir.path().join("out");

    let mut config = common::test_config();
    config.translation.need_translate = false;
    let provider = MockProvider::failing();
    let written = controller(config, provider.clone()).run(input, Some(out_dir.clone()), false).await?;

    assert_eq!(written, vec![out_dir.join("talk.cues.srt")]);
    let srt = std::fs::read_to_string(&written[0])?;
    assert_eq!(
        srt,
        "1\n00:00:00,000 --> 00:00:01,800\nhello world this is cuesmith\n\n2\n00:00:05,000 --> 00:00:06,300\nsecond cue here\n"
    );
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withUnreachableProvider_shouldFailBeforeWriting() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_word_json(dir.path(), "talk.json", &common::two_clause_words())?;

    let result = controller(common::test_config(), MockProvider::failing()).run(input, None, false).await;
    assert!(result.is_err());
    assert!(!dir.path().join("talk.fr.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withGarbageAnswers_shouldFallBackAndLogIssues() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_word_json(dir.path(), "talk.json", &common::two_clause_words())?;

    let mut config = common::test_config();
    config.translation.max_rounds = 2;
    let written = controller(config, MockProvider::new(MockBehavior::Garbage)).run(input, None, false).await?;

    let srt = std::fs::read_to_string(&written[0])?;
    assert!(srt.contains("second cue here\nsecond cue here\n"));
    let log = std::fs::read_to_string(dir.path().join(ISSUES_LOG_NAME))?;
    assert!(log.contains("cue 1 kept original text: hello world this is cuesmith"));
    assert!(log.contains("cue 2 kept original text: second cue here"));
    Ok(())
}

#[tokio::test]
async fn test_run_folder_shouldSkipOwnOutputsAndExistingTranslations() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_word_json(dir.path(), "a.json", &common::two_clause_words())?;
    common::create_word_srt(dir.path(), "b.srt", &common::two_clause_words())?;

    let provider = MockProvider::echo();
    let controller = controller(common::test_config(), provider.clone());

    controller.run_folder(dir.path().to_path_buf(), false).await?;
    assert!(dir.path().join("a.fr.srt").exists());
    assert!(dir.path().join("b.fr.srt").exists());
    assert!(!dir.path().join("b.fr.fr.srt").exists());

    // second pass finds only finished inputs
    let requests = provider.request_count();
    controller.run_folder(dir.path().to_path_buf(), false).await?;
    assert_eq!(provider.request_count(), requests);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withConfigJson_shouldIgnoreIt() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_word_json(dir.path(), "talk.json", &common::two_clause_words())?;
    common::create_test_file(dir.path(), "conf.json", &serde_json::to_string_pretty(&Config::default())?)?;

    let provider = MockProvider::echo();
    let controller = controller(common::test_config(), provider.clone());
    controller.run_folder(dir.path().to_path_buf(), false).await?;

    assert!(dir.path().join("talk.fr.srt").exists());
    assert!(!dir.path().join("conf.fr.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withOnlyNonTranscriptJson_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(dir.path(), "settings.json", r#"{"theme": "dark"}"#)?;

    let controller = controller(common::test_config(), MockProvider::echo());
    assert!(controller.run_folder(dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withEmptyDir_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let controller = controller(common::test_config(), MockProvider::echo());
    assert!(controller.run_folder(dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}
