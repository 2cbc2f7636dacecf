//! Mapping between submissions, score reports, and persisted rows.
//!
//! One row holds the submitted input and its final score report, so a
//! submission is always written as a single logical record.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{
    AnswerSet, ObjectiveResponse, ObjectiveSkill, SpeakingTask, SubjectiveTask, SubmissionType,
    TaskType, WritingTask, WritingTaskNumber,
};
use crate::results::{FeedbackPayload, ScoreReport, ScoringStatus};
use crate::traits::{row_id, Row, ID_COLUMN};

/// Columns rewritten when fresh feedback replaces the stored one.
pub const FEEDBACK_COLUMNS: [&str; 10] = [
    "status",
    "band_score",
    "task_response",
    "coherence_cohesion",
    "fluency_coherence",
    "pronunciation",
    "lexical_resource",
    "grammatical_range",
    "ai_feedback",
    "updated_at",
];

/// A submission together with its score report, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub task_type: TaskType,
    pub status: ScoringStatus,
    /// Writing task prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Essay text or speaking transcript.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_type: Option<SubmissionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_feedback_requested: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    pub band_score: f64,
    #[serde(default)]
    pub task_response: Option<f64>,
    #[serde(default)]
    pub coherence_cohesion: Option<f64>,
    #[serde(default)]
    pub fluency_coherence: Option<f64>,
    #[serde(default)]
    pub pronunciation: Option<f64>,
    #[serde(default)]
    pub lexical_resource: Option<f64>,
    #[serde(default)]
    pub grammatical_range: Option<f64>,
    pub ai_feedback: FeedbackPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<AnswerSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<AnswerSet>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total_questions: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubmissionRecord {
    /// Record for an assessed (or fallback-scored) writing or speaking task.
    pub fn subjective(
        task: &SubjectiveTask,
        task_type: TaskType,
        feedback: FeedbackPayload,
        status: ScoringStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::empty(task_type, feedback.clone(), created_at);
        match task {
            SubjectiveTask::Writing(writing) => {
                record.prompt = Some(writing.prompt.clone());
                record.content = Some(writing.content.clone());
                record.submission_type = Some(writing.submission_type);
                record.human_feedback_requested = Some(writing.human_feedback_requested);
                record.word_count = Some(writing.word_count());
            }
            SubjectiveTask::Speaking(speaking) => {
                record.question = Some(speaking.question.clone());
                record.content = Some(speaking.transcript.clone());
                record.part_number = Some(speaking.part_number);
                record.duration_secs = Some(speaking.duration_secs);
            }
        }
        record.apply_feedback(feedback, status, None);
        record
    }

    /// Record for a locally scored reading or listening response.
    pub fn objective(
        skill: ObjectiveSkill,
        response: &ObjectiveResponse,
        score: u32,
        feedback: FeedbackPayload,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::empty(skill.task_type(), feedback, created_at);
        record.test_id = response.test_id.clone();
        record.answers = Some(response.answers.clone());
        record.correct_answers = Some(response.correct_answers.clone());
        record.score = score;
        record.total_questions = response.total_questions;
        record
    }

    fn empty(task_type: TaskType, feedback: FeedbackPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            task_type,
            status: ScoringStatus::Scored,
            prompt: None,
            content: None,
            submission_type: None,
            human_feedback_requested: None,
            question: None,
            part_number: None,
            duration_secs: None,
            word_count: None,
            band_score: feedback.band_score(),
            task_response: None,
            coherence_cohesion: None,
            fluency_coherence: None,
            pronunciation: None,
            lexical_resource: None,
            grammatical_range: None,
            ai_feedback: feedback,
            test_id: None,
            answers: None,
            correct_answers: None,
            score: 0,
            total_questions: 0,
            created_at,
            updated_at: None,
        }
    }

    /// Replace the feedback and the denormalized score columns.
    pub fn apply_feedback(
        &mut self,
        feedback: FeedbackPayload,
        status: ScoringStatus,
        updated_at: Option<DateTime<Utc>>,
    ) {
        self.status = status;
        self.band_score = feedback.band_score();
        for (name, value) in feedback.criteria() {
            let column = match name {
                "task_response" => &mut self.task_response,
                "coherence_cohesion" => &mut self.coherence_cohesion,
                "fluency_coherence" => &mut self.fluency_coherence,
                "pronunciation" => &mut self.pronunciation,
                "lexical_resource" => &mut self.lexical_resource,
                "grammatical_range" => &mut self.grammatical_range,
                _ => continue,
            };
            *column = Some(value);
        }
        self.ai_feedback = feedback;
        self.updated_at = updated_at;
    }

    /// Rebuild the subjective task this record was created from.
    pub fn subjective_task(&self) -> Option<SubjectiveTask> {
        match self.task_type {
            TaskType::WritingTask1 | TaskType::WritingTask2 => {
                let task = if self.task_type == TaskType::WritingTask1 {
                    WritingTaskNumber::Task1
                } else {
                    WritingTaskNumber::Task2
                };
                Some(SubjectiveTask::Writing(WritingTask {
                    task,
                    prompt: self.prompt.clone()?,
                    content: self.content.clone()?,
                    submission_type: self.submission_type.unwrap_or_default(),
                    human_feedback_requested: self.human_feedback_requested.unwrap_or(false),
                }))
            }
            TaskType::SpeakingPart1 | TaskType::SpeakingPart2 | TaskType::SpeakingPart3 => {
                Some(SubjectiveTask::Speaking(SpeakingTask {
                    part_number: self.part_number?,
                    question: self.question.clone()?,
                    transcript: self.content.clone()?,
                    duration_secs: self.duration_secs.unwrap_or(0),
                }))
            }
            TaskType::Reading | TaskType::Listening => None,
        }
    }

    pub fn to_report(&self, submission_id: Uuid) -> ScoreReport {
        ScoreReport {
            submission_id,
            task_type: self.task_type,
            status: self.status,
            score: self.score,
            total_questions: self.total_questions,
            band_score: self.band_score,
            word_count: self.word_count,
            feedback: self.ai_feedback.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_row(&self) -> Result<Row> {
        match serde_json::to_value(self).context("failed to serialize submission record")? {
            Value::Object(row) => Ok(row),
            other => anyhow::bail!("submission record serialized to non-object: {other}"),
        }
    }

    /// The subset of this record's columns that feedback updates touch.
    pub fn feedback_patch(&self) -> Result<Row> {
        let mut row = self.to_row()?;
        row.retain(|column, _| FEEDBACK_COLUMNS.contains(&column.as_str()));
        Ok(row)
    }

    /// Parse a stored row back into its id and record.
    pub fn from_row(row: Row) -> Result<(Uuid, Self)> {
        let id = row_id(&row).with_context(|| format!("row has no valid `{ID_COLUMN}` column"))?;
        let record: SubmissionRecord = serde_json::from_value(Value::Object(row))
            .with_context(|| format!("failed to parse submission record {id}"))?;
        Ok((id, record))
    }
}
