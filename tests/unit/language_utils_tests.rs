/*!
 * Tests for language code utilities and prompt tables
 */

use cuesmith::language_utils::{
    self, AUDIO_TYPES, STYLE_LANGUAGE, SUBJECT_CONTENT,
};

#[test]
fn test_normalize_to_part2t_withVariousForms_shouldReturnThreeLetterCode() {
    assert_eq!(language_utils::normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(language_utils::normalize_to_part2t(" FR ").unwrap(), "fra");
    assert_eq!(language_utils::normalize_to_part2t("ger").unwrap(), "deu");
    assert!(language_utils::normalize_to_part2t("zz").is_err());
    assert!(language_utils::normalize_to_part2t("english").is_err());
}

#[test]
fn test_language_codes_match_acrossIsoForms_shouldMatch() {
    assert!(language_utils::language_codes_match("de", "ger"));
    assert!(language_utils::language_codes_match("deu", "DE"));
    assert!(!language_utils::language_codes_match("de", "fr"));
    assert!(!language_utils::language_codes_match("auto", "auto"));
}

#[test]
fn test_validate_languages_shouldAcceptTablesAndIsoCodes() {
    assert!(language_utils::validate_source_language("auto").is_ok());
    assert!(language_utils::validate_source_language("yue").is_ok());
    assert!(language_utils::validate_source_language("nl").is_ok());
    assert!(language_utils::validate_source_language("zh-hans").is_err());

    assert!(language_utils::validate_target_language("zh-hans").is_ok());
    assert!(language_utils::validate_target_language("PT-BR").is_ok());
    assert!(language_utils::validate_target_language("fr").is_ok());
    assert!(language_utils::validate_target_language("auto").is_err());
}

#[test]
fn test_describe_withPromptTables_shouldFallBackToCode() {
    assert_eq!(language_utils::describe(AUDIO_TYPES, "comedy"), "comedy sketch");
    assert_eq!(language_utils::describe(SUBJECT_CONTENT, "Programming"), "software programming");
    assert_eq!(language_utils::describe(STYLE_LANGUAGE, "calm"), "calm");
    assert_eq!(language_utils::describe(STYLE_LANGUAGE, "grumpy"), "grumpy");
}

#[test]
fn test_get_language_name_shouldUseEnglishNames() {
    assert_eq!(language_utils::get_language_name("de").unwrap(), "German");
    assert_eq!(language_utils::describe_language("deu"), "German");
}
