//! Collaborators supplied by the host quiz engine.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    FileRef, FreeTextFieldConfig, QtData, QuestionConfig, ResponseBundle, Step, StepState,
    VarValue,
};

/// Read-only view of an attempt's history.
pub trait AttemptContext: Send + Sync {
    fn state(&self) -> StepState;

    fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    fn last_step(&self) -> Option<&Step>;

    /// Most recent value of a behaviour variable across all steps.
    fn last_behaviour_var(&self, name: &str) -> Option<&VarValue>;

    /// Response fields of the most recent step that had any.
    fn last_qt_data(&self) -> Option<&QtData>;

    /// Links the attempt to the usage that owns its stored files.
    fn usage_id(&self) -> &str;
}

/// Rules of the question type being attempted.
pub trait QuestionType: Send + Sync {
    fn config(&self) -> &QuestionConfig;

    fn is_gradable_response(&self, response: &QtData) -> bool;

    fn is_complete_response(&self, response: &QtData) -> bool {
        self.is_gradable_response(response)
    }

    fn is_same_response(&self, previous: &QtData, next: &QtData) -> bool {
        previous == next
    }

    fn summarise_response(&self, response: &QtData) -> Option<String>;

    fn right_answer_summary(&self) -> Option<String> {
        None
    }

    fn min_fraction(&self) -> f64 {
        0.0
    }

    fn max_fraction(&self) -> f64 {
        1.0
    }
}

/// External grader. Returns the state the submitted step should take:
/// `PendingGrade` when the job was queued, `Graded` when it finished inline.
#[async_trait]
pub trait GradingService: Send + Sync {
    async fn grade_async(
        &self,
        attempt: &dyn AttemptContext,
        response: &ResponseBundle,
    ) -> Result<StepState>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn resolve_files(&self, field: &str, context_id: i64) -> Result<Vec<FileRef>>;
}

/// Maps a usage id to the context its files are stored under.
#[async_trait]
pub trait UsageContextResolver: Send + Sync {
    async fn context_id(&self, usage_id: &str) -> Result<i64>;
}

#[async_trait]
pub trait ConfigLookup: Send + Sync {
    async fn get(&self, question_id: &str, field_index: usize)
        -> Result<Option<FreeTextFieldConfig>>;
}
