pub mod attempt;
pub mod certainty;
pub mod question;
pub mod response;
pub mod step;

pub use attempt::Attempt;
pub use certainty::CertaintyLevel;
pub use question::{ExpectedData, FreeTextFieldConfig, ParamType, QuestionConfig};
pub use response::{FileCollection, FileRef, QtData, QtValue, ResponseBundle, SubmittedAnswer};
pub use step::{BehaviourVars, Outcome, PendingStep, ResumeData, Step, StepState, VarValue};
