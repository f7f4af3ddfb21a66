type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Submitted response could not be assembled for grading.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no files available for required field '{field}'")]
    MissingFiles { field: String },

    #[error("failed to resolve submission context for usage {usage_id}")]
    ContextResolution {
        usage_id: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read stored files for field '{field}' in context {context_id}")]
    ContentStore {
        field: String,
        context_id: i64,
        #[source]
        source: BoxError,
    },

    #[error("failed to look up free-text field {field_index} of question {question_id}")]
    ConfigLookup {
        question_id: String,
        field_index: usize,
        #[source]
        source: BoxError,
    },

    #[error("invalid question configuration: {0}")]
    InvalidConfig(String),
}

impl CaptureError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CaptureError::MissingFiles { .. } => "missing_files",
            CaptureError::ContextResolution { .. } => "context_resolution",
            CaptureError::ContentStore { .. } => "content_store",
            CaptureError::ConfigLookup { .. } => "config_lookup",
            CaptureError::InvalidConfig(_) => "invalid_config",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BehaviourError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("grading service rejected the submission")]
    Grading(#[source] BoxError),

    #[error("grading returned fraction {0} outside [-1, 1]")]
    FractionOutOfRange(f64),
}
