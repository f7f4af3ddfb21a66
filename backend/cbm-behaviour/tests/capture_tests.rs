mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use cbm_behaviour::models::response::ANSWER_FIELD;
use cbm_behaviour::models::{FreeTextFieldConfig, SubmittedAnswer};
use cbm_behaviour::services::ResponseCapture;
use cbm_behaviour::CaptureError;

use common::*;

fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn placeholder() -> SubmittedAnswer {
    SubmittedAnswer::Placeholder {
        field: ANSWER_FIELD.to_string(),
    }
}

#[tokio::test]
async fn test_empty_fields_are_skipped() {
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());

    let answers = capture
        .capture_free_text(&free_text(&["", "hello", ""]), &question_config())
        .await
        .unwrap();

    assert_eq!(answers, map(&[("File2.txt", "hello")]));
}

#[tokio::test]
async fn test_learner_filename_used_without_auto_generation() {
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());
    let mut config = question_config();
    config.fts_auto_generate_filenames = false;

    let data = with_filename(free_text(&["class A {}", "b"]), 0, "A.java");
    let answers = capture.capture_free_text(&data, &config).await.unwrap();

    assert_eq!(answers, map(&[("A.java", "class A {}"), ("File2.txt", "b")]));
}

#[tokio::test]
async fn test_preset_filename_overrides_learner() {
    let lookup = InMemoryConfigLookup::default().with_row(
        "q-java-1",
        1,
        FreeTextFieldConfig {
            preset_filename: true,
            filename: Some("Solution.java".to_string()),
        },
    );
    let capture = capture_with(InMemoryContentStore::default(), lookup);

    let data = with_filename(free_text(&["", "class Solution {}"]), 1, "Mine.java");
    let answers = capture
        .capture_free_text(&data, &question_config())
        .await
        .unwrap();

    assert_eq!(answers, map(&[("Solution.java", "class Solution {}")]));
}

#[tokio::test]
async fn test_colliding_filenames_keep_last_index() {
    let mut config = question_config();
    config.fts_auto_generate_filenames = false;
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());

    let data = with_filename(
        with_filename(free_text(&["first", "second"]), 0, "Same.java"),
        1,
        "Same.java",
    );
    let answers = capture.capture_free_text(&data, &config).await.unwrap();

    assert_eq!(answers, map(&[("Same.java", "second")]));
}

#[tokio::test]
async fn test_fields_beyond_max_are_ignored() {
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());
    let mut config = question_config();
    config.fts_max_num_fields = 1;

    let answers = capture
        .capture_free_text(&free_text(&["a", "b"]), &config)
        .await
        .unwrap();

    assert_eq!(answers, map(&[("File1.txt", "a")]));
}

#[tokio::test]
async fn test_field_count_above_cap_is_rejected() {
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());
    let mut config = question_config();
    config.fts_max_num_fields = fast_settings().max_free_text_fields + 1;

    let err = capture
        .capture_free_text(&free_text(&["a"]), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, CaptureError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_fresh_upload_is_used_directly() {
    let store = InMemoryContentStore::default();
    let capture = capture_with(store, InMemoryConfigLookup::default());

    let files = capture
        .capture_files(
            ANSWER_FIELD,
            Some(&fresh_upload(&["A.java", "B.java"])),
            USAGE_ID,
            true,
        )
        .await
        .unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["A.java", "B.java"]);
}

#[tokio::test]
async fn test_placeholder_retries_content_store() {
    init_tracing();
    let mut store =
        InMemoryContentStore::with_files(ANSWER_FIELD, CONTEXT_ID, vec![file("Main.java")]);
    store.failures_before_success = 2;
    let store = Arc::new(store);

    let capture = ResponseCapture::new(
        store.clone(),
        Arc::new(StaticContexts::single()),
        Arc::new(InMemoryConfigLookup::default()),
        fast_settings(),
    );

    let files = capture
        .capture_files(ANSWER_FIELD, Some(&placeholder()), USAGE_ID, true)
        .await
        .unwrap();

    assert_eq!(files, vec![file("Main.java")]);
    assert_eq!(store.reads(), 3);
}

#[tokio::test]
async fn test_placeholder_store_failure_propagates() {
    let mut store = InMemoryContentStore::default();
    store.failures_before_success = usize::MAX;
    let capture = capture_with(store, InMemoryConfigLookup::default());

    let err = capture
        .capture_files(ANSWER_FIELD, Some(&placeholder()), USAGE_ID, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CaptureError::ContentStore {
            context_id: CONTEXT_ID,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unknown_usage_fails_context_resolution() {
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());

    let err = capture
        .capture_files(ANSWER_FIELD, Some(&placeholder()), "usage-unknown", true)
        .await
        .unwrap_err();

    assert!(matches!(err, CaptureError::ContextResolution { .. }));
}

#[tokio::test]
async fn test_missing_optional_files_yield_empty_set() {
    let capture = capture_with(InMemoryContentStore::default(), InMemoryConfigLookup::default());

    let files = capture
        .capture_files(ANSWER_FIELD, None, USAGE_ID, false)
        .await
        .unwrap();
    assert!(files.is_empty());

    let err = capture
        .capture_files(ANSWER_FIELD, None, USAGE_ID, true)
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::MissingFiles { .. }));
}
