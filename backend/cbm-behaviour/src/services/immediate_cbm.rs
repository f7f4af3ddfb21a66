use async_trait::async_trait;
use std::sync::Arc;

use crate::error::BehaviourError;
use crate::metrics::{record_capture_failure, record_grading_result, record_submission};
use crate::models::response::ANSWER_FIELD;
use crate::models::step::{
    RESUME_CERTAINTY, VAR_ASSUMED_CERTAINTY, VAR_CERTAINTY, VAR_GRADING_RESULT, VAR_RAW_FRACTION,
    VAR_SUBMIT,
};
use crate::models::{
    BehaviourVars, CertaintyLevel, ExpectedData, Outcome, ParamType, PendingStep, ResponseBundle,
    ResumeData, Step, StepState, VarValue,
};
use crate::services::behaviour::{BaseBehaviour, Behaviour};
use crate::services::cbm;
use crate::services::host::{AttemptContext, GradingService, QuestionType};
use crate::services::immediate::ImmediateBehaviour;
use crate::services::response_capture::ResponseCapture;

/// Immediate feedback with certainty-based marking for file and free-text
/// submissions.
///
/// The learner submits once together with a certainty. The response is sent
/// to the external grader, and when the result comes back its fraction is
/// scaled by that certainty.
pub struct ImmediateCbmBehaviour {
    base: Arc<dyn BaseBehaviour>,
    question: Arc<dyn QuestionType>,
    grader: Arc<dyn GradingService>,
    capture: ResponseCapture,
}

impl ImmediateCbmBehaviour {
    pub fn new(
        base: Arc<dyn BaseBehaviour>,
        question: Arc<dyn QuestionType>,
        grader: Arc<dyn GradingService>,
        capture: ResponseCapture,
    ) -> Self {
        Self {
            base,
            question,
            grader,
            capture,
        }
    }

    /// Builds on [`ImmediateBehaviour`] for the same question.
    pub fn with_immediate_base(
        question: Arc<dyn QuestionType>,
        grader: Arc<dyn GradingService>,
        capture: ResponseCapture,
    ) -> Self {
        let base = Arc::new(ImmediateBehaviour::new(question.clone()));
        Self::new(base, question, grader, capture)
    }

    async fn capture_response(
        &self,
        attempt: &dyn AttemptContext,
        pending: &PendingStep,
    ) -> Result<ResponseBundle, BehaviourError> {
        let config = self.question.config();
        let mut bundle = ResponseBundle::default();

        if config.enable_file_submissions {
            let files = self
                .capture
                .capture_files(
                    ANSWER_FIELD,
                    pending.qt_data().files(ANSWER_FIELD),
                    attempt.usage_id(),
                    config.files_required(),
                )
                .await?;
            bundle.add_files(files);
        }

        if config.enable_free_text_submissions {
            bundle.free_text = self
                .capture
                .capture_free_text(pending.qt_data(), config)
                .await?;
        }

        Ok(bundle)
    }
}

#[async_trait]
impl Behaviour for ImmediateCbmBehaviour {
    /// Base minimum scored at the highest certainty.
    fn min_fraction(&self) -> f64 {
        cbm::adjust_fraction(self.base.min_fraction(), CertaintyLevel::High)
    }

    fn max_fraction(&self) -> f64 {
        cbm::adjust_fraction(self.base.max_fraction(), CertaintyLevel::High)
    }

    fn expected_data(&self, attempt: &dyn AttemptContext) -> ExpectedData {
        if attempt.is_active() {
            return ExpectedData::from([
                (VAR_SUBMIT, ParamType::Bool),
                (VAR_CERTAINTY, ParamType::Int),
            ]);
        }
        self.base.expected_data(attempt)
    }

    fn right_answer_summary(&self) -> Option<String> {
        self.base
            .right_answer_summary()
            .map(|summary| cbm::annotate_summary(&summary, CertaintyLevel::High))
    }

    fn correct_response(&self, attempt: &dyn AttemptContext) -> BehaviourVars {
        let mut response = BehaviourVars::new();
        if attempt.is_active() {
            response.insert(VAR_CERTAINTY.to_string(), CertaintyLevel::High.into());
        }
        response
    }

    fn resume_data(&self, attempt: &dyn AttemptContext) -> ResumeData {
        let mut data = self.base.resume_data(attempt);
        if let Some(certainty) = attempt.last_behaviour_var(VAR_CERTAINTY) {
            data.behaviour
                .insert(RESUME_CERTAINTY.to_string(), certainty.clone());
        }
        data
    }

    /// A certainty-only change is a new response. Levels are compared, not
    /// their encodings, so `2` and `"2"` are the same certainty.
    fn is_same_response(&self, attempt: &dyn AttemptContext, pending: &PendingStep) -> bool {
        let previous = attempt
            .last_behaviour_var(VAR_CERTAINTY)
            .and_then(VarValue::as_certainty);
        self.base.is_same_response(attempt, pending) && previous == pending.certainty()
    }

    /// Complete only with a certainty a submission would accept.
    fn is_complete_response(&self, pending: &PendingStep) -> bool {
        self.base.is_complete_response(pending) && pending.certainty().is_some()
    }

    async fn process_action(
        &self,
        attempt: &dyn AttemptContext,
        pending: PendingStep,
    ) -> Result<Outcome<Step>, BehaviourError> {
        let grading_result = pending
            .behaviour_var(VAR_GRADING_RESULT)
            .is_some_and(VarValue::is_truthy);
        let submit = pending
            .behaviour_var(VAR_SUBMIT)
            .is_some_and(VarValue::is_truthy);

        if grading_result {
            self.process_grading_result(attempt, pending)
        } else if submit {
            self.process_submit(attempt, pending).await
        } else {
            Ok(self.process_save(attempt, pending))
        }
    }

    fn process_save(&self, attempt: &dyn AttemptContext, mut pending: PendingStep) -> Outcome<Step> {
        if attempt.is_finished() || self.is_same_response(attempt, &pending) {
            return Outcome::Discard;
        }

        tracing::debug!(
            "Saving response: usage={}, complete={}",
            attempt.usage_id(),
            self.is_complete_response(&pending)
        );

        pending.set_state(StepState::Active);
        let summary = self.question.summarise_response(pending.qt_data());
        pending.set_new_response_summary(summary);
        Outcome::Keep(pending.commit())
    }

    async fn process_submit(
        &self,
        attempt: &dyn AttemptContext,
        mut pending: PendingStep,
    ) -> Result<Outcome<Step>, BehaviourError> {
        if attempt.is_finished() {
            tracing::debug!(
                "Discarding submission for finished attempt: usage={}",
                attempt.usage_id()
            );
            record_submission("discarded");
            return Ok(Outcome::Discard);
        }

        let gradable = self.question.is_gradable_response(pending.qt_data());
        let certainty = pending.certainty();
        if !gradable || certainty.is_none() {
            tracing::warn!(
                "Submission saved as invalid: usage={}, gradable={}, certainty={:?}",
                attempt.usage_id(),
                gradable,
                certainty
            );
            pending.set_state(StepState::Invalid);
            record_submission("invalid");
            return Ok(Outcome::Keep(pending.commit()));
        }

        let bundle = match self.capture_response(attempt, &pending).await {
            Ok(bundle) => bundle,
            Err(BehaviourError::Capture(e)) => {
                tracing::error!(
                    "Failed to capture response: usage={}, error={}",
                    attempt.usage_id(),
                    e
                );
                record_capture_failure(e.reason());
                record_submission("failed");
                return Err(e.into());
            }
            Err(e) => return Err(e),
        };

        let state = self.grader.grade_async(attempt, &bundle).await.map_err(|e| {
            record_submission("failed");
            BehaviourError::Grading(e.into())
        })?;

        pending.set_state(state);
        let summary = self.question.summarise_response(pending.qt_data());
        pending.set_new_response_summary(summary);

        tracing::info!(
            "Submission dispatched for grading: usage={}, files={}, free_text={}, state={:?}",
            attempt.usage_id(),
            bundle.files.len(),
            bundle.free_text.len(),
            state
        );
        record_submission("dispatched");

        Ok(Outcome::Keep(pending.commit()))
    }

    fn process_grading_result(
        &self,
        attempt: &dyn AttemptContext,
        pending: PendingStep,
    ) -> Result<Outcome<Step>, BehaviourError> {
        let mut pending = match self.base.process_grading_result(attempt, pending) {
            Outcome::Keep(pending) => pending,
            Outcome::Discard => {
                record_grading_result("discarded", "none");
                return Ok(Outcome::Discard);
            }
        };

        if let Some(raw) = pending.fraction() {
            if !(-1.0..=1.0).contains(&raw) {
                return Err(BehaviourError::FractionOutOfRange(raw));
            }
        }

        let (certainty, source) = match attempt.last_step().and_then(Step::certainty) {
            Some(certainty) => (certainty, "learner"),
            None => {
                let certainty = cbm::default_certainty();
                pending.set_behaviour_var(VAR_ASSUMED_CERTAINTY, certainty);
                (certainty, "assumed")
            }
        };

        if let Some(raw) = pending.fraction() {
            let adjusted = cbm::adjust_fraction(raw, certainty);
            pending.set_behaviour_var(VAR_RAW_FRACTION, raw);
            pending.set_fraction(Some(adjusted));

            tracing::info!(
                "Grading result: usage={}, raw={}, adjusted={}, certainty={} ({})",
                attempt.usage_id(),
                raw,
                adjusted,
                certainty,
                source
            );
        }

        let summary = pending
            .new_response_summary()
            .map(|summary| cbm::annotate_summary(summary, certainty));
        pending.set_new_response_summary(summary);

        record_grading_result("kept", source);
        Ok(Outcome::Keep(pending.commit()))
    }

    fn summarise_action(&self, step: &Step) -> String {
        let summary = self.base.summarise_action(step);
        match step.certainty() {
            Some(certainty) => cbm::annotate_summary(&summary, certainty),
            None => summary,
        }
    }
}
