//! Certainty-based marking.
//!
//! A right answer earns `right_score(certainty) * fraction`; a wrong answer
//! (fraction at or below [`WRONG_THRESHOLD`]) earns the fixed
//! `wrong_score(certainty)`, which is a penalty above the lowest level.

use crate::models::CertaintyLevel;

/// Fractions at or below this count as wrong.
pub const WRONG_THRESHOLD: f64 = 0.000_000_05;

fn right_score(certainty: CertaintyLevel) -> f64 {
    match certainty {
        CertaintyLevel::Unrated | CertaintyLevel::Low => 1.0,
        CertaintyLevel::Medium => 2.0,
        CertaintyLevel::High => 3.0,
    }
}

fn wrong_score(certainty: CertaintyLevel) -> f64 {
    match certainty {
        CertaintyLevel::Unrated | CertaintyLevel::Low => 0.0,
        CertaintyLevel::Medium => -2.0,
        CertaintyLevel::High => -6.0,
    }
}

/// Level assumed when the learner never picked one.
pub fn default_certainty() -> CertaintyLevel {
    CertaintyLevel::Low
}

/// Scales `fraction` (in `[-1, 1]`, checked by the caller) by `certainty`.
pub fn adjust_fraction(fraction: f64, certainty: CertaintyLevel) -> f64 {
    debug_assert!(
        (-1.0..=1.0).contains(&fraction),
        "fraction {fraction} out of range"
    );

    if !certainty.is_rated() {
        return fraction;
    }
    if fraction <= WRONG_THRESHOLD {
        wrong_score(certainty)
    } else {
        right_score(certainty) * fraction
    }
}

/// Appends a short certainty marker, e.g. `"42 [C=3]"`.
pub fn annotate_summary(summary: &str, certainty: CertaintyLevel) -> String {
    if !certainty.is_rated() {
        return summary.to_string();
    }
    format!("{} [{}]", summary, short_label(certainty))
}

fn short_label(certainty: CertaintyLevel) -> String {
    format!("C={}", certainty.code())
}
