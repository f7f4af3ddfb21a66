use std::sync::Arc;

use crate::models::step::VAR_SUBMIT;
use crate::models::{
    ExpectedData, Outcome, ParamType, PendingStep, QtData, ResumeData, Step, StepState,
};
use crate::services::behaviour::BaseBehaviour;
use crate::services::host::{AttemptContext, QuestionType};

/// Submit-once, immediate-feedback behaviour without certainty.
pub struct ImmediateBehaviour {
    question: Arc<dyn QuestionType>,
}

impl ImmediateBehaviour {
    pub fn new(question: Arc<dyn QuestionType>) -> Self {
        Self { question }
    }
}

impl BaseBehaviour for ImmediateBehaviour {
    fn min_fraction(&self) -> f64 {
        self.question.min_fraction()
    }

    fn max_fraction(&self) -> f64 {
        self.question.max_fraction()
    }

    fn expected_data(&self, attempt: &dyn AttemptContext) -> ExpectedData {
        let mut expected = ExpectedData::new();
        if attempt.is_active() {
            expected.insert(VAR_SUBMIT, ParamType::Bool);
        }
        expected
    }

    fn right_answer_summary(&self) -> Option<String> {
        self.question.right_answer_summary()
    }

    fn resume_data(&self, attempt: &dyn AttemptContext) -> ResumeData {
        ResumeData {
            qt: attempt
                .last_qt_data()
                .map(QtData::text_fields)
                .unwrap_or_default(),
            ..ResumeData::default()
        }
    }

    fn is_same_response(&self, attempt: &dyn AttemptContext, pending: &PendingStep) -> bool {
        let empty = QtData::new();
        let previous = attempt.last_qt_data().unwrap_or(&empty);
        self.question.is_same_response(previous, pending.qt_data())
    }

    fn is_complete_response(&self, pending: &PendingStep) -> bool {
        self.question.is_complete_response(pending.qt_data())
    }

    /// Accepts a result only while a submission is outstanding. Anything else,
    /// including a second result for a graded attempt, is a stale delivery.
    fn process_grading_result(
        &self,
        attempt: &dyn AttemptContext,
        mut pending: PendingStep,
    ) -> Outcome<PendingStep> {
        match attempt.state() {
            StepState::PendingGrade => {}
            state => {
                tracing::debug!(
                    "Ignoring grading result for usage={} in state {:?}",
                    attempt.usage_id(),
                    state
                );
                return Outcome::Discard;
            }
        }

        if pending.new_response_summary().is_none() {
            let summary = attempt
                .last_step()
                .and_then(Step::response_summary)
                .map(str::to_string);
            pending.set_new_response_summary(summary);
        }
        pending.set_state(StepState::Graded);

        Outcome::Keep(pending)
    }

    fn summarise_action(&self, step: &Step) -> String {
        let action = match step.state() {
            StepState::Invalid => "Invalid submission",
            StepState::PendingGrade => "Submitted",
            StepState::Graded => "Graded",
            StepState::Active | StepState::Discarded => "Saved",
        };

        match step.response_summary() {
            Some(summary) if !summary.is_empty() => format!("{}: {}", action, summary),
            _ => action.to_string(),
        }
    }
}
