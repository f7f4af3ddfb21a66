use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::certainty::CertaintyLevel;
use super::response::QtData;

pub const VAR_SUBMIT: &str = "submit";
pub const VAR_CERTAINTY: &str = "certainty";
pub const VAR_GRADING_RESULT: &str = "gradingresult";
pub const VAR_RAW_FRACTION: &str = "_rawfraction";
pub const VAR_ASSUMED_CERTAINTY: &str = "_assumedcertainty";
/// Resume data key carrying the last certainty forward.
pub const RESUME_CERTAINTY: &str = "-certainty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Active,
    Invalid,
    PendingGrade,
    Graded,
    Discarded,
}

impl StepState {
    /// The learner may still change and submit the response.
    pub fn is_active(self) -> bool {
        matches!(self, StepState::Active | StepState::Invalid)
    }

    pub fn is_finished(self) -> bool {
        !self.is_active()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl VarValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            VarValue::Int(value) => Some(*value),
            VarValue::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            VarValue::Float(value) => Some(*value),
            VarValue::Int(value) => Some(*value as f64),
            VarValue::Text(value) => value.trim().parse().ok(),
            VarValue::Bool(_) => None,
        }
    }

    /// Form-style truthiness: `true`, non-zero numbers and non-empty text
    /// other than `"0"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            VarValue::Bool(value) => *value,
            VarValue::Int(value) => *value != 0,
            VarValue::Float(value) => *value != 0.0,
            VarValue::Text(value) => !value.is_empty() && value != "0",
        }
    }

    /// Certainty a learner submitted, if the value names a selectable level.
    pub fn as_certainty(&self) -> Option<CertaintyLevel> {
        self.as_int().and_then(CertaintyLevel::from_submitted)
    }
}

impl From<CertaintyLevel> for VarValue {
    fn from(level: CertaintyLevel) -> Self {
        VarValue::Int(level.code())
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        VarValue::Bool(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Float(value)
    }
}

pub type BehaviourVars = BTreeMap<String, VarValue>;

/// Committed, immutable record of one transition of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    id: Uuid,
    state: StepState,
    behaviour_vars: BehaviourVars,
    qt_data: QtData,
    fraction: Option<f64>,
    response_summary: Option<String>,
    created_at: DateTime<Utc>,
}

impl Step {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn behaviour_vars(&self) -> &BehaviourVars {
        &self.behaviour_vars
    }

    pub fn behaviour_var(&self, name: &str) -> Option<&VarValue> {
        self.behaviour_vars.get(name)
    }

    pub fn has_behaviour_var(&self, name: &str) -> bool {
        self.behaviour_vars.contains_key(name)
    }

    pub fn certainty(&self) -> Option<CertaintyLevel> {
        self.behaviour_var(VAR_CERTAINTY)
            .and_then(VarValue::as_certainty)
    }

    pub fn qt_data(&self) -> &QtData {
        &self.qt_data
    }

    pub fn fraction(&self) -> Option<f64> {
        self.fraction
    }

    pub fn response_summary(&self) -> Option<&str> {
        self.response_summary.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Draft of a step while an action is being processed.
///
/// Only [`PendingStep::commit`] produces a [`Step`], so callers never see a
/// half-processed record.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingStep {
    state: StepState,
    behaviour_vars: BehaviourVars,
    qt_data: QtData,
    fraction: Option<f64>,
    response_summary: Option<String>,
}

impl Default for PendingStep {
    fn default() -> Self {
        Self {
            state: StepState::Active,
            behaviour_vars: BehaviourVars::new(),
            qt_data: QtData::new(),
            fraction: None,
            response_summary: None,
        }
    }
}

impl PendingStep {
    pub fn new(qt_data: QtData) -> Self {
        Self {
            qt_data,
            ..Self::default()
        }
    }

    /// Draft for a grading-result event delivered by the grading service.
    pub fn grading_result(fraction: Option<f64>) -> Self {
        let mut step = Self::default();
        step.set_behaviour_var(VAR_GRADING_RESULT, true);
        step.fraction = fraction;
        step
    }

    pub fn with_behaviour_var(mut self, name: &str, value: impl Into<VarValue>) -> Self {
        self.set_behaviour_var(name, value);
        self
    }

    pub fn with_certainty(self, certainty: CertaintyLevel) -> Self {
        self.with_behaviour_var(VAR_CERTAINTY, certainty)
    }

    pub fn submitted(self) -> Self {
        self.with_behaviour_var(VAR_SUBMIT, true)
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn set_state(&mut self, state: StepState) {
        self.state = state;
    }

    pub fn qt_data(&self) -> &QtData {
        &self.qt_data
    }

    pub fn behaviour_var(&self, name: &str) -> Option<&VarValue> {
        self.behaviour_vars.get(name)
    }

    pub fn has_behaviour_var(&self, name: &str) -> bool {
        self.behaviour_vars.contains_key(name)
    }

    pub fn set_behaviour_var(&mut self, name: &str, value: impl Into<VarValue>) {
        self.behaviour_vars.insert(name.to_string(), value.into());
    }

    pub fn certainty(&self) -> Option<CertaintyLevel> {
        self.behaviour_var(VAR_CERTAINTY)
            .and_then(VarValue::as_certainty)
    }

    pub fn fraction(&self) -> Option<f64> {
        self.fraction
    }

    pub fn set_fraction(&mut self, fraction: Option<f64>) {
        self.fraction = fraction;
    }

    pub fn new_response_summary(&self) -> Option<&str> {
        self.response_summary.as_deref()
    }

    pub fn set_new_response_summary(&mut self, summary: Option<String>) {
        self.response_summary = summary;
    }

    pub fn commit(self) -> Step {
        Step {
            id: Uuid::new_v4(),
            state: self.state,
            behaviour_vars: self.behaviour_vars,
            qt_data: self.qt_data,
            fraction: self.fraction,
            response_summary: self.response_summary,
            created_at: Utc::now(),
        }
    }
}

/// Whether the host should store the processed step.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Keep(T),
    Discard,
}

impl<T> Outcome<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Outcome::Keep(_))
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, Outcome::Discard)
    }

    pub fn kept(self) -> Option<T> {
        match self {
            Outcome::Keep(value) => Some(value),
            Outcome::Discard => None,
        }
    }
}

/// Data needed to continue an attempt in a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub qt: QtData,
    pub behaviour: BehaviourVars,
}
