//! Certainty-based-marking behaviour for file and free-text questions.
//!
//! A behaviour decides how a question attempt reacts to learner and system
//! actions. [`ImmediateCbmBehaviour`] accepts one submission together with a
//! certainty, hands the response to an external grader and, when the grade
//! arrives, scales it by the certainty the learner declared.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use config::BehaviourConfig;
pub use error::{BehaviourError, CaptureError};
pub use services::{Behaviour, ImmediateCbmBehaviour};
