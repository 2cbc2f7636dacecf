//! Scoring error types.
//!
//! `FeedbackError` is what a feedback provider reports back to the
//! orchestrator; `ScoringError` is what callers of the orchestrator see.
//! Both live in `bandscore-core` so the orchestrator can classify failures
//! for fallback decisions without string matching.

use std::time::Duration;

use thiserror::Error;

use crate::state::SubmissionState;

/// Errors a feedback provider can signal for a single assessment.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedbackError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("feedback provider unavailable: {message}")]
    ProviderUnavailable {
        message: String,
        /// `false` when repeating the request cannot help (e.g. a rejected API key).
        retryable: bool,
        /// Wait requested by the provider before the next attempt.
        retry_after: Option<Duration>,
    },

    /// The provider answered, but not with the requested JSON shape.
    #[error("malformed provider response: {0}")]
    MalformedProviderResponse(String),
}

impl FeedbackError {
    /// A provider outage worth retrying.
    pub fn unavailable(message: impl Into<String>) -> Self {
        FeedbackError::ProviderUnavailable {
            message: message.into(),
            retryable: true,
            retry_after: None,
        }
    }

    /// A provider failure that will repeat on every attempt.
    pub fn permanent(message: impl Into<String>) -> Self {
        FeedbackError::ProviderUnavailable {
            message: message.into(),
            retryable: false,
            retry_after: None,
        }
    }

    /// Returns `true` if repeating the same request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FeedbackError::ProviderUnavailable {
                retryable: true,
                ..
            }
        )
    }

    /// The provider's requested delay before retrying, if it sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FeedbackError::ProviderUnavailable { retry_after, .. } => *retry_after,
            FeedbackError::MalformedProviderResponse(_) => None,
        }
    }
}

/// Errors surfaced by the submission orchestrator.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Zero total questions, empty answer key, blank essay, and the like.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Feedback could not be obtained. Submissions recover from this with
    /// fallback content; only feedback refreshes can observe it.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    /// The result could not be durably recorded.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// A submission tried to move between lifecycle states out of order.
    #[error("illegal submission transition {from} -> {to}")]
    IllegalTransition {
        from: SubmissionState,
        to: SubmissionState,
    },
}

impl ScoringError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ScoringError::InvalidInput(message.into())
    }

    pub(crate) fn persistence(err: anyhow::Error) -> Self {
        ScoringError::PersistenceFailure(format!("{err:#}"))
    }
}
