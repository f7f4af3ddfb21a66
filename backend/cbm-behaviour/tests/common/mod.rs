#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cbm_behaviour::config::CaptureSettings;
use cbm_behaviour::models::response::{answer_filename_field, answer_text_field, ANSWER_FIELD};
use cbm_behaviour::models::{
    FileCollection, FileRef, FreeTextFieldConfig, QtData, QtValue, QuestionConfig,
    ResponseBundle, StepState, SubmittedAnswer,
};
use cbm_behaviour::services::{
    AttemptContext, ConfigLookup, ContentStore, GradingService, ImmediateCbmBehaviour,
    QuestionType, ResponseCapture, UsageContextResolver,
};

pub const USAGE_ID: &str = "usage-42";
pub const CONTEXT_ID: i64 = 1337;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn question_config() -> QuestionConfig {
    QuestionConfig {
        question_id: "q-java-1".to_string(),
        enable_file_submissions: true,
        enable_free_text_submissions: true,
        fts_max_num_fields: 3,
        fts_auto_generate_filenames: true,
    }
}

pub fn file(name: &str) -> FileRef {
    FileRef {
        filename: name.to_string(),
        content_hash: format!("sha256:{}", name),
        size_bytes: 128,
    }
}

pub fn fresh_upload(names: &[&str]) -> SubmittedAnswer {
    SubmittedAnswer::Fresh(FileCollection {
        files: names.iter().map(|name| file(name)).collect(),
    })
}

pub fn free_text(texts: &[&str]) -> QtData {
    let mut data = QtData::new();
    for (index, text) in texts.iter().enumerate() {
        data.insert(answer_text_field(index), QtValue::Text(text.to_string()));
    }
    data
}

pub fn with_filename(data: QtData, index: usize, name: &str) -> QtData {
    data.with_text(answer_filename_field(index), name)
}

/// Gradable when any free-text field or the file field carries something.
pub struct FakeQuestion {
    pub config: QuestionConfig,
}

impl QuestionType for FakeQuestion {
    fn config(&self) -> &QuestionConfig {
        &self.config
    }

    fn is_gradable_response(&self, response: &QtData) -> bool {
        let has_text = (0..self.config.fts_max_num_fields)
            .any(|i| response.text(&answer_text_field(i)).is_some_and(|t| !t.is_empty()));
        has_text || response.files(ANSWER_FIELD).is_some()
    }

    fn summarise_response(&self, response: &QtData) -> Option<String> {
        let texts: Vec<&str> = (0..self.config.fts_max_num_fields)
            .filter_map(|i| response.text(&answer_text_field(i)))
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("; "))
        }
    }

    fn right_answer_summary(&self) -> Option<String> {
        Some("All tests pass".to_string())
    }
}

/// Grader that records every bundle and answers with a fixed state.
pub struct RecordingGrader {
    pub state: StepState,
    pub fail: bool,
    pub calls: Mutex<Vec<ResponseBundle>>,
}

impl RecordingGrader {
    pub fn returning(state: StepState) -> Self {
        Self {
            state,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            state: StepState::PendingGrade,
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ResponseBundle> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GradingService for RecordingGrader {
    async fn grade_async(
        &self,
        _attempt: &dyn AttemptContext,
        response: &ResponseBundle,
    ) -> Result<StepState> {
        self.calls.lock().unwrap().push(response.clone());
        if self.fail {
            return Err(anyhow!("grading queue unavailable"));
        }
        Ok(self.state)
    }
}

/// Content store that fails a configurable number of reads first.
#[derive(Default)]
pub struct InMemoryContentStore {
    pub files: HashMap<(String, i64), Vec<FileRef>>,
    pub failures_before_success: usize,
    pub reads: AtomicUsize,
}

impl InMemoryContentStore {
    pub fn with_files(field: &str, context_id: i64, files: Vec<FileRef>) -> Self {
        let mut store = Self::default();
        store.files.insert((field.to_string(), context_id), files);
        store
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn resolve_files(&self, field: &str, context_id: i64) -> Result<Vec<FileRef>> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        if n < self.failures_before_success {
            return Err(anyhow!("content store read {} failed", n + 1));
        }
        Ok(self
            .files
            .get(&(field.to_string(), context_id))
            .cloned()
            .unwrap_or_default())
    }
}

pub struct StaticContexts(pub HashMap<String, i64>);

impl StaticContexts {
    pub fn single() -> Self {
        Self(HashMap::from([(USAGE_ID.to_string(), CONTEXT_ID)]))
    }
}

#[async_trait]
impl UsageContextResolver for StaticContexts {
    async fn context_id(&self, usage_id: &str) -> Result<i64> {
        self.0
            .get(usage_id)
            .copied()
            .ok_or_else(|| anyhow!("usage {} not found", usage_id))
    }
}

#[derive(Default)]
pub struct InMemoryConfigLookup {
    pub rows: HashMap<(String, usize), FreeTextFieldConfig>,
}

impl InMemoryConfigLookup {
    pub fn with_row(mut self, question_id: &str, index: usize, row: FreeTextFieldConfig) -> Self {
        self.rows.insert((question_id.to_string(), index), row);
        self
    }
}

#[async_trait]
impl ConfigLookup for InMemoryConfigLookup {
    async fn get(&self, question_id: &str, field_index: usize) -> Result<Option<FreeTextFieldConfig>> {
        Ok(self
            .rows
            .get(&(question_id.to_string(), field_index))
            .cloned())
    }
}

pub fn fast_settings() -> CaptureSettings {
    CaptureSettings {
        regrade_retry_attempts: 3,
        regrade_retry_backoff_ms: 1,
        max_free_text_fields: 10,
    }
}

pub fn capture_with(store: InMemoryContentStore, lookup: InMemoryConfigLookup) -> ResponseCapture {
    ResponseCapture::new(
        Arc::new(store),
        Arc::new(StaticContexts::single()),
        Arc::new(lookup),
        fast_settings(),
    )
}

pub struct Harness {
    pub behaviour: ImmediateCbmBehaviour,
    pub grader: Arc<RecordingGrader>,
}

pub fn harness_with(config: QuestionConfig, grader: RecordingGrader, store: InMemoryContentStore) -> Harness {
    init_tracing();

    let grader = Arc::new(grader);
    let question = Arc::new(FakeQuestion { config });
    let capture = capture_with(store, InMemoryConfigLookup::default());
    let behaviour = ImmediateCbmBehaviour::with_immediate_base(question, grader.clone(), capture);

    Harness { behaviour, grader }
}

pub fn harness() -> Harness {
    harness_with(
        question_config(),
        RecordingGrader::returning(StepState::PendingGrade),
        InMemoryContentStore::default(),
    )
}
