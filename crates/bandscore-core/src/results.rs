//! Score reports and the feedback they carry.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::TaskType;

/// The three advice lists attached to every piece of feedback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commentary {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Commentary {
    pub fn is_complete(&self) -> bool {
        !self.strengths.is_empty() && !self.improvements.is_empty() && !self.suggestions.is_empty()
    }
}

/// Writing assessment against the four writing criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingFeedback {
    pub band_score: f64,
    pub task_response: f64,
    pub coherence_cohesion: f64,
    pub lexical_resource: f64,
    pub grammatical_range: f64,
    /// Free-text comment per criterion, keyed by criterion name.
    #[serde(default)]
    pub detailed_feedback: BTreeMap<String, String>,
    #[serde(flatten)]
    pub commentary: Commentary,
}

/// Speaking assessment against the four speaking criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakingFeedback {
    pub band_score: f64,
    pub fluency_coherence: f64,
    pub pronunciation: f64,
    pub lexical_resource: f64,
    pub grammatical_range: f64,
    #[serde(default)]
    pub detailed_feedback: BTreeMap<String, String>,
    #[serde(flatten)]
    pub commentary: Commentary,
}

/// Generic skill advice for a locally scored reading or listening test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveFeedback {
    pub band_score: f64,
    #[serde(flatten)]
    pub commentary: Commentary,
}

/// Feedback attached to a score report, tagged by category so writing and
/// speaking criteria can never be mixed up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum FeedbackPayload {
    Writing(WritingFeedback),
    Speaking(SpeakingFeedback),
    Objective(ObjectiveFeedback),
}

impl FeedbackPayload {
    pub fn band_score(&self) -> f64 {
        match self {
            FeedbackPayload::Writing(f) => f.band_score,
            FeedbackPayload::Speaking(f) => f.band_score,
            FeedbackPayload::Objective(f) => f.band_score,
        }
    }

    pub fn commentary(&self) -> &Commentary {
        match self {
            FeedbackPayload::Writing(f) => &f.commentary,
            FeedbackPayload::Speaking(f) => &f.commentary,
            FeedbackPayload::Objective(f) => &f.commentary,
        }
    }

    /// Named sub-criterion scores, empty for objective feedback.
    pub fn criteria(&self) -> Vec<(&'static str, f64)> {
        match self {
            FeedbackPayload::Writing(f) => vec![
                ("task_response", f.task_response),
                ("coherence_cohesion", f.coherence_cohesion),
                ("lexical_resource", f.lexical_resource),
                ("grammatical_range", f.grammatical_range),
            ],
            FeedbackPayload::Speaking(f) => vec![
                ("fluency_coherence", f.fluency_coherence),
                ("pronunciation", f.pronunciation),
                ("lexical_resource", f.lexical_resource),
                ("grammatical_range", f.grammatical_range),
            ],
            FeedbackPayload::Objective(_) => Vec::new(),
        }
    }
}

/// How the band score of a report was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStatus {
    /// Scored locally, or by the feedback provider.
    Scored,
    /// The provider failed and neutral fallback feedback was substituted.
    FallbackScored,
}

/// The unified result returned for every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub submission_id: Uuid,
    pub task_type: TaskType,
    pub status: ScoringStatus,
    /// Correct answers; zero for subjective tasks.
    pub score: u32,
    /// Questions in the test; zero for subjective tasks.
    pub total_questions: u32,
    pub band_score: f64,
    #[serde(default)]
    pub word_count: Option<u32>,
    pub feedback: FeedbackPayload,
    pub created_at: DateTime<Utc>,
}

impl ScoreReport {
    pub fn is_fallback(&self) -> bool {
        self.status == ScoringStatus::FallbackScored
    }
}
