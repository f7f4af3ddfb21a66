use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Upper bound any question may declare for free-text fields.
pub const FREE_TEXT_FIELDS_LIMIT: usize = 100;

/// Per-question submission settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionConfig {
    #[validate(length(min = 1, message = "Question id must not be empty"))]
    pub question_id: String,

    pub enable_file_submissions: bool,

    pub enable_free_text_submissions: bool,

    #[validate(range(
        max = FREE_TEXT_FIELDS_LIMIT,
        message = "Free-text field count exceeds the limit"
    ))]
    pub fts_max_num_fields: usize,

    pub fts_auto_generate_filenames: bool,
}

impl QuestionConfig {
    /// Files are the only way to answer, so an empty file set cannot be graded.
    pub fn files_required(&self) -> bool {
        self.enable_file_submissions && !self.enable_free_text_submissions
    }
}

/// Configuration row for one free-text input of a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextFieldConfig {
    /// When set, `filename` replaces whatever the learner typed.
    pub preset_filename: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Bool,
    Int,
}

/// Submitted fields a behaviour reads, with their expected types.
pub type ExpectedData = BTreeMap<&'static str, ParamType>;
