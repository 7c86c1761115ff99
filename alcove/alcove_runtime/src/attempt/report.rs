//! Attempt reports.

use std::fmt;

use alcove_core::error::Error;
use alcove_core::FailureKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lifecycle::AttemptState;
use crate::resolver::StrategyKind;

/// Final verdict of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    /// The module ran and its context was reclaimed.
    Pass,

    /// Something failed, or the context survived.
    Fail,
}

/// Why an attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    /// Coarse classification of the error
    pub kind: FailureKind,

    /// The error as displayed
    pub message: String,
}

impl From<&Error> for AttemptFailure {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// What happened during one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    /// The attempt number, starting at 1
    pub number: usize,

    /// The strategy under test
    pub strategy: StrategyKind,

    /// Pass or fail
    pub outcome: AttemptOutcome,

    /// Whether the liveness probe confirmed the context was reclaimed
    pub collected: bool,

    /// Whether the strategy is known to let the context go
    pub expected_collectible: bool,

    /// The furthest step reached before unloading
    pub reached: AttemptState,

    /// The first error of the attempt, if any
    pub failure: Option<AttemptFailure>,

    /// When the attempt started
    pub started_at: DateTime<Utc>,

    /// Wall time of the whole attempt, probe included
    pub duration_ms: u64,
}

impl AttemptReport {
    /// Whether the attempt passed.
    pub fn successful(&self) -> bool {
        self.outcome == AttemptOutcome::Pass
    }

    /// Whether the outcome is the one this strategy is known to produce.
    pub fn matches_expectation(&self) -> bool {
        self.successful() == self.expected_collectible
    }
}

impl fmt::Display for AttemptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attempt #{} successful: {}", self.number, self.successful())
    }
}
