use serde::{Deserialize, Serialize};

use super::response::QtData;
use super::step::{Step, StepState, VarValue};
use crate::services::host::AttemptContext;

/// One learner's interaction with one question instance.
///
/// Steps are appended by the host once a behaviour decides to keep them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attempt {
    usage_id: String,
    steps: Vec<Step>,
}

impl Attempt {
    pub fn new(usage_id: impl Into<String>) -> Self {
        Self {
            usage_id: usage_id.into(),
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl AttemptContext for Attempt {
    fn state(&self) -> StepState {
        self.steps
            .last()
            .map(Step::state)
            .unwrap_or(StepState::Active)
    }

    fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    fn last_behaviour_var(&self, name: &str) -> Option<&VarValue> {
        self.steps
            .iter()
            .rev()
            .find_map(|step| step.behaviour_var(name))
    }

    fn last_qt_data(&self) -> Option<&QtData> {
        self.steps
            .iter()
            .rev()
            .map(Step::qt_data)
            .find(|data| !data.is_empty())
    }

    fn usage_id(&self) -> &str {
        &self.usage_id
    }
}
