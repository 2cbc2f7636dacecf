//! Per-submission scoring lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::results::ScoringStatus;

/// Where a submission is in its scoring lifecycle.
///
/// Objective: `Created → Scoring → Scored`.
/// Subjective: `Created → AwaitingFeedback → Scored | FallbackScored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Created,
    Scoring,
    AwaitingFeedback,
    Scored,
    FallbackScored,
}

impl SubmissionState {
    pub fn can_advance_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Created, Scoring)
                | (Scoring, Scored)
                | (Created, AwaitingFeedback)
                | (AwaitingFeedback, Scored)
                | (AwaitingFeedback, FallbackScored)
        )
    }

    /// The persisted status, once the state is terminal.
    pub fn status(self) -> Option<ScoringStatus> {
        match self {
            SubmissionState::Scored => Some(ScoringStatus::Scored),
            SubmissionState::FallbackScored => Some(ScoringStatus::FallbackScored),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Created => "created",
            SubmissionState::Scoring => "scoring",
            SubmissionState::AwaitingFeedback => "awaiting_feedback",
            SubmissionState::Scored => "scored",
            SubmissionState::FallbackScored => "fallback_scored",
        };
        f.write_str(name)
    }
}

/// Tracks and logs the lifecycle of one submission.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: SubmissionState,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: SubmissionState::Created,
        }
    }

    pub(crate) fn state(&self) -> SubmissionState {
        self.state
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub(crate) fn advance(&mut self, next: SubmissionState) -> Result<(), ScoringError> {
        if !self.state.can_advance_to(next) {
            return Err(ScoringError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "submission state");
        self.state = next;
        Ok(())
    }
}
