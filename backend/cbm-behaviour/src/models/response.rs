use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Question-type field holding uploaded files.
pub const ANSWER_FIELD: &str = "answer";

pub fn answer_text_field(index: usize) -> String {
    format!("answertext{}", index)
}

pub fn answer_filename_field(index: usize) -> String {
    format!("answerfilename{}", index)
}

/// Reference to a file held by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub filename: String,
    pub content_hash: String,
    pub size_bytes: u64,
}

/// Files uploaded in the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCollection {
    pub files: Vec<FileRef>,
}

/// Value of the file field on a submitted step.
///
/// A fresh upload carries its files. During a regrade the transient upload is
/// gone and only a placeholder naming the field remains; the files must then
/// be re-fetched from the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmittedAnswer {
    Fresh(FileCollection),
    Placeholder { field: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QtValue {
    Text(String),
    Files(SubmittedAnswer),
}

/// Question-type response fields of one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QtData(BTreeMap<String, QtValue>);

impl QtData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, QtValue::Text(value.into()));
        self
    }

    pub fn with_files(mut self, name: impl Into<String>, answer: SubmittedAnswer) -> Self {
        self.insert(name, QtValue::Files(answer));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: QtValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&QtValue> {
        self.0.get(name)
    }

    /// Text value of a field; `None` when absent or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(QtValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn files(&self, name: &str) -> Option<&SubmittedAnswer> {
        match self.0.get(name) {
            Some(QtValue::Files(answer)) => Some(answer),
            _ => None,
        }
    }

    /// Copy holding only the text fields.
    pub fn text_fields(&self) -> QtData {
        QtData(
            self.0
                .iter()
                .filter(|(_, value)| matches!(value, QtValue::Text(_)))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything handed to the grading service for one grading call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBundle {
    pub files: BTreeMap<String, FileRef>,
    pub free_text: BTreeMap<String, String>,
}

impl ResponseBundle {
    pub fn add_files(&mut self, files: impl IntoIterator<Item = FileRef>) {
        for file in files {
            self.files.insert(file.filename.clone(), file);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.free_text.is_empty()
    }
}
