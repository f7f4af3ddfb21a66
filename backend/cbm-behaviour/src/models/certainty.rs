use serde::{Deserialize, Serialize};
use std::fmt;

/// How sure a learner says they are that their response is right.
///
/// Levels are totally ordered (`Unrated < Low < Medium < High`) and are
/// stored on steps by their numeric code, so a step variable `certainty = 3`
/// means [`CertaintyLevel::High`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum CertaintyLevel {
    /// Certainty does not apply. Fractions and summaries pass through untouched.
    Unrated,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown certainty level code {0}")]
pub struct UnknownCertainty(pub i64);

impl CertaintyLevel {
    /// Levels a learner may pick, lowest first.
    pub const SELECTABLE: [CertaintyLevel; 3] =
        [CertaintyLevel::Low, CertaintyLevel::Medium, CertaintyLevel::High];

    pub fn code(self) -> i64 {
        match self {
            CertaintyLevel::Unrated => -1,
            CertaintyLevel::Low => 1,
            CertaintyLevel::Medium => 2,
            CertaintyLevel::High => 3,
        }
    }

    /// Parses a level a learner submitted. The unrated sentinel is never a
    /// valid submission.
    pub fn from_submitted(code: i64) -> Option<Self> {
        match Self::try_from(code) {
            Ok(CertaintyLevel::Unrated) | Err(_) => None,
            Ok(level) => Some(level),
        }
    }

    pub fn is_rated(self) -> bool {
        self != CertaintyLevel::Unrated
    }
}

impl TryFrom<i64> for CertaintyLevel {
    type Error = UnknownCertainty;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(CertaintyLevel::Unrated),
            1 => Ok(CertaintyLevel::Low),
            2 => Ok(CertaintyLevel::Medium),
            3 => Ok(CertaintyLevel::High),
            other => Err(UnknownCertainty(other)),
        }
    }
}

impl From<CertaintyLevel> for i64 {
    fn from(level: CertaintyLevel) -> Self {
        level.code()
    }
}

impl fmt::Display for CertaintyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertaintyLevel::Unrated => write!(f, "unrated"),
            CertaintyLevel::Low => write!(f, "low"),
            CertaintyLevel::Medium => write!(f, "medium"),
            CertaintyLevel::High => write!(f, "high"),
        }
    }
}
