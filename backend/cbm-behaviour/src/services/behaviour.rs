use async_trait::async_trait;

use crate::error::BehaviourError;
use crate::models::{BehaviourVars, ExpectedData, Outcome, PendingStep, ResumeData, Step};
use crate::services::host::AttemptContext;

/// Behaviour a specialised behaviour builds on. It is injected as a delegate
/// and called through explicitly.
pub trait BaseBehaviour: Send + Sync {
    fn min_fraction(&self) -> f64;

    fn max_fraction(&self) -> f64;

    fn expected_data(&self, attempt: &dyn AttemptContext) -> ExpectedData;

    fn right_answer_summary(&self) -> Option<String>;

    fn resume_data(&self, attempt: &dyn AttemptContext) -> ResumeData;

    fn is_same_response(&self, attempt: &dyn AttemptContext, pending: &PendingStep) -> bool;

    fn is_complete_response(&self, pending: &PendingStep) -> bool;

    fn process_grading_result(
        &self,
        attempt: &dyn AttemptContext,
        pending: PendingStep,
    ) -> Outcome<PendingStep>;

    fn summarise_action(&self, step: &Step) -> String;
}

/// What the host framework calls on a behaviour.
#[async_trait]
pub trait Behaviour: Send + Sync {
    /// Lowest fraction any step of this behaviour can carry.
    fn min_fraction(&self) -> f64;

    fn max_fraction(&self) -> f64;

    fn expected_data(&self, attempt: &dyn AttemptContext) -> ExpectedData;

    fn right_answer_summary(&self) -> Option<String>;

    /// Behaviour variables of a fully correct submission.
    fn correct_response(&self, attempt: &dyn AttemptContext) -> BehaviourVars;

    fn resume_data(&self, attempt: &dyn AttemptContext) -> ResumeData;

    fn is_same_response(&self, attempt: &dyn AttemptContext, pending: &PendingStep) -> bool;

    fn is_complete_response(&self, pending: &PendingStep) -> bool;

    async fn process_action(
        &self,
        attempt: &dyn AttemptContext,
        pending: PendingStep,
    ) -> Result<Outcome<Step>, BehaviourError>;

    fn process_save(&self, attempt: &dyn AttemptContext, pending: PendingStep) -> Outcome<Step>;

    async fn process_submit(
        &self,
        attempt: &dyn AttemptContext,
        pending: PendingStep,
    ) -> Result<Outcome<Step>, BehaviourError>;

    fn process_grading_result(
        &self,
        attempt: &dyn AttemptContext,
        pending: PendingStep,
    ) -> Result<Outcome<Step>, BehaviourError>;

    fn summarise_action(&self, step: &Step) -> String;
}
