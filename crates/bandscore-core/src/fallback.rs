//! Fixed, non-personalized feedback.
//!
//! Substituted by the orchestrator when the feedback provider cannot be
//! used, and attached as generic advice to objective results.

use std::collections::BTreeMap;

use crate::model::{ObjectiveSkill, SubjectiveTask};
use crate::results::{
    Commentary, FeedbackPayload, ObjectiveFeedback, SpeakingFeedback, WritingFeedback,
};

/// Overall and per-criterion band used when no assessment is available.
pub const NEUTRAL_BAND: f64 = 6.5;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Neutral feedback for a subjective task whose assessment failed.
pub fn fallback_feedback(task: &SubjectiveTask) -> FeedbackPayload {
    match task {
        SubjectiveTask::Writing(_) => FeedbackPayload::Writing(WritingFeedback {
            band_score: NEUTRAL_BAND,
            task_response: NEUTRAL_BAND,
            coherence_cohesion: NEUTRAL_BAND,
            lexical_resource: NEUTRAL_BAND,
            grammatical_range: NEUTRAL_BAND,
            detailed_feedback: BTreeMap::new(),
            commentary: Commentary {
                strengths: lines(&[
                    "Good task achievement with a clear position",
                    "Generally well-organized structure",
                ]),
                improvements: lines(&[
                    "Use more varied cohesive devices",
                    "Expand vocabulary with more precise synonyms",
                    "Work on complex sentence structures",
                ]),
                suggestions: lines(&[
                    "Practice using conditional sentences",
                    "Learn more academic vocabulary",
                    "Focus on paragraph transitions",
                ]),
            },
        }),
        SubjectiveTask::Speaking(_) => FeedbackPayload::Speaking(SpeakingFeedback {
            band_score: NEUTRAL_BAND,
            fluency_coherence: NEUTRAL_BAND,
            pronunciation: NEUTRAL_BAND,
            lexical_resource: NEUTRAL_BAND,
            grammatical_range: NEUTRAL_BAND,
            detailed_feedback: BTreeMap::new(),
            commentary: Commentary {
                strengths: lines(&[
                    "Good fluency with a natural rhythm",
                    "Appropriate use of vocabulary",
                ]),
                improvements: lines(&[
                    "Work on specific sound pronunciation",
                    "Use more varied vocabulary",
                    "Practice complex grammatical structures",
                ]),
                suggestions: lines(&[
                    "Record yourself daily",
                    "Learn idiomatic expressions",
                    "Practice speaking on unfamiliar topics",
                ]),
            },
        }),
    }
}

/// Generic advice for a locally scored test.
pub fn objective_feedback(skill: ObjectiveSkill, band_score: f64) -> FeedbackPayload {
    let commentary = match skill {
        ObjectiveSkill::Reading => Commentary {
            strengths: lines(&[
                "Good comprehension of main ideas",
                "Effective scanning for specific information",
            ]),
            improvements: lines(&[
                "Work on time management",
                "Practice identifying paraphrased information",
            ]),
            suggestions: lines(&["Read academic texts daily", "Practice skimming techniques"]),
        },
        ObjectiveSkill::Listening => Commentary {
            strengths: lines(&["Good attention to detail", "Effective note-taking"]),
            improvements: lines(&[
                "Practice with different accents",
                "Work on spelling accuracy",
            ]),
            suggestions: lines(&[
                "Listen to English podcasts daily",
                "Practice dictation exercises",
            ]),
        },
    };
    FeedbackPayload::Objective(ObjectiveFeedback {
        band_score,
        commentary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeakingTask;

    #[test]
    fn speaking_fallback_is_neutral_and_complete() {
        let task = SubjectiveTask::Speaking(SpeakingTask {
            part_number: 1,
            question: "Do you work or study?".into(),
            transcript: "I study".into(),
            duration_secs: 20,
        });
        let payload = fallback_feedback(&task);
        assert!(matches!(payload, FeedbackPayload::Speaking(_)));
        assert_eq!(payload.band_score(), NEUTRAL_BAND);
        assert!(payload.criteria().iter().all(|(_, s)| *s == NEUTRAL_BAND));
        assert!(payload.commentary().is_complete());
    }

    #[test]
    fn objective_advice_keeps_the_band() {
        let payload = objective_feedback(ObjectiveSkill::Listening, 7.0);
        assert_eq!(payload.band_score(), 7.0);
        assert!(payload.commentary().is_complete());
        assert!(payload.criteria().is_empty());
    }
}
