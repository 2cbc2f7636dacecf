//! Submission orchestrator.
//!
//! Scores objective responses locally, obtains provider feedback for
//! subjective ones, substitutes fallback feedback when the provider fails,
//! and persists each submission with its report as one record.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::band::band_for_score;
use crate::error::{FeedbackError, ScoringError};
use crate::fallback::{fallback_feedback, objective_feedback};
use crate::model::{
    ObjectiveResponse, ObjectiveSkill, Skill, SpeakingTask, SubjectiveTask, TaskType, TestSession,
    WritingTask,
};
use crate::record::SubmissionRecord;
use crate::results::{FeedbackPayload, ScoreReport, ScoringStatus};
use crate::scorer::score_answers;
use crate::state::{Lifecycle, SubmissionState};
use crate::traits::{row_id, FeedbackProvider, RecordStore, Row, Table};

/// Upper bound on any single wait between feedback attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the submission orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Extra attempts after a provider outage. Malformed replies are never retried.
    pub max_feedback_retries: u32,
    /// Delay before the first retry; doubles per attempt.
    pub retry_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_feedback_retries: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Coordinates scoring, feedback, and persistence for submissions.
pub struct SubmissionOrchestrator {
    feedback: Arc<dyn FeedbackProvider>,
    store: Arc<dyn RecordStore>,
    config: OrchestratorConfig,
}

impl SubmissionOrchestrator {
    pub fn new(
        feedback: Arc<dyn FeedbackProvider>,
        store: Arc<dyn RecordStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            feedback,
            store,
            config,
        }
    }

    /// Open a practice session for `test_type`.
    pub async fn create_test_session(&self, test_type: Skill) -> Result<TestSession, ScoringError> {
        let started_at = Utc::now();
        let mut row = Row::new();
        row.insert("test_type".into(), Value::String(test_type.to_string()));
        row.insert("started_at".into(), Value::String(started_at.to_rfc3339()));

        let stored = self
            .store
            .insert(Table::TestSessions, row)
            .await
            .map_err(ScoringError::persistence)?;
        let id = row_id(&stored).ok_or_else(|| {
            ScoringError::PersistenceFailure("store returned a session without an id".into())
        })?;
        info!(%id, %test_type, "test session created");

        Ok(TestSession {
            id,
            test_type,
            started_at,
        })
    }

    pub async fn submit_writing_essay(&self, task: WritingTask) -> Result<ScoreReport, ScoringError> {
        self.submit_subjective(SubjectiveTask::Writing(task)).await
    }

    pub async fn submit_speaking_recording(
        &self,
        task: SpeakingTask,
    ) -> Result<ScoreReport, ScoringError> {
        self.submit_subjective(SubjectiveTask::Speaking(task)).await
    }

    pub async fn submit_reading_response(
        &self,
        response: ObjectiveResponse,
    ) -> Result<ScoreReport, ScoringError> {
        self.submit_objective(ObjectiveSkill::Reading, response).await
    }

    pub async fn submit_listening_response(
        &self,
        response: ObjectiveResponse,
    ) -> Result<ScoreReport, ScoringError> {
        self.submit_objective(ObjectiveSkill::Listening, response)
            .await
    }

    /// Score a reading or listening response against its answer key.
    #[instrument(skip(self, response), fields(total = response.total_questions))]
    pub async fn submit_objective(
        &self,
        skill: ObjectiveSkill,
        response: ObjectiveResponse,
    ) -> Result<ScoreReport, ScoringError> {
        validate_objective(&response)?;
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(SubmissionState::Scoring)?;

        let score = score_answers(&response.answers, &response.correct_answers);
        let band = band_for_score(score, response.total_questions)?;
        let record = SubmissionRecord::objective(
            skill,
            &response,
            score,
            objective_feedback(skill, band),
            Utc::now(),
        );
        lifecycle.advance(SubmissionState::Scored)?;

        let id = self.persist(&record).await?;
        info!(%id, task = %record.task_type, score, band, "objective submission scored");
        Ok(record.to_report(id))
    }

    /// Assess a writing or speaking task.
    ///
    /// Provider failures never surface here: the report then carries neutral
    /// fallback feedback with status [`ScoringStatus::FallbackScored`].
    #[instrument(skip(self, task), fields(skill = %task.skill()))]
    pub async fn submit_subjective(&self, task: SubjectiveTask) -> Result<ScoreReport, ScoringError> {
        let task_type = validate_subjective(&task)?;
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(SubmissionState::AwaitingFeedback)?;

        let feedback = match self.request_feedback(&task).await {
            Ok(feedback) => {
                lifecycle.advance(SubmissionState::Scored)?;
                feedback
            }
            Err(e) => {
                warn!(provider = self.feedback.name(), "using fallback feedback: {e}");
                lifecycle.advance(SubmissionState::FallbackScored)?;
                fallback_feedback(&task)
            }
        };
        let status = lifecycle.state().status().unwrap_or(ScoringStatus::FallbackScored);

        let record = SubmissionRecord::subjective(&task, task_type, feedback, status, Utc::now());
        let id = self.persist(&record).await?;
        info!(%id, task = %task_type, band = record.band_score, ?status, "subjective submission scored");
        Ok(record.to_report(id))
    }

    /// Read a stored submission back as a score report.
    pub async fn load_report(&self, task_type: TaskType, id: Uuid) -> Result<ScoreReport, ScoringError> {
        let (_, record) = self.load_record(task_type, id).await?;
        Ok(record.to_report(id))
    }

    /// Ask the provider again for a stored writing or speaking submission.
    ///
    /// On success the stored record is updated in place. If the provider
    /// still fails, the stored report is returned unchanged.
    #[instrument(skip(self))]
    pub async fn refresh_feedback(
        &self,
        task_type: TaskType,
        id: Uuid,
    ) -> Result<ScoreReport, ScoringError> {
        if task_type.is_objective() {
            return Err(ScoringError::invalid(format!(
                "{task_type} submissions are scored locally and have no provider feedback"
            )));
        }
        let (table, mut record) = self.load_record(task_type, id).await?;
        let task = record.subjective_task().ok_or_else(|| {
            ScoringError::PersistenceFailure(format!("stored submission {id} is incomplete"))
        })?;

        match self.request_feedback(&task).await {
            Ok(feedback) => {
                record.apply_feedback(feedback, ScoringStatus::Scored, Some(Utc::now()));
                let patch = record.feedback_patch().map_err(ScoringError::persistence)?;
                self.store
                    .update(table, id, patch)
                    .await
                    .map_err(ScoringError::persistence)?;
                info!(%id, band = record.band_score, "feedback refreshed");
            }
            Err(e) => warn!(%id, "feedback refresh failed, keeping stored report: {e}"),
        }
        Ok(record.to_report(id))
    }

    async fn load_record(
        &self,
        task_type: TaskType,
        id: Uuid,
    ) -> Result<(Table, SubmissionRecord), ScoringError> {
        let table = Table::for_task(task_type);
        let row = self
            .store
            .select(table, id)
            .await
            .map_err(ScoringError::persistence)?
            .ok_or_else(|| ScoringError::invalid(format!("no {task_type} submission {id}")))?;
        let (_, record) = SubmissionRecord::from_row(row).map_err(ScoringError::persistence)?;
        if record.task_type != task_type {
            return Err(ScoringError::invalid(format!(
                "submission {id} is {}, not {task_type}",
                record.task_type
            )));
        }
        Ok((table, record))
    }

    /// Request feedback, retrying transient outages with exponential backoff.
    ///
    /// A provider-supplied retry-after hint replaces the backoff delay for
    /// that attempt. Permanent failures and malformed replies return at once.
    async fn request_feedback(&self, task: &SubjectiveTask) -> Result<FeedbackPayload, FeedbackError> {
        let mut delay = self.config.retry_delay;
        let mut attempt = 0;
        loop {
            match self.feedback.assess(task).await {
                Ok(feedback) => return Ok(feedback),
                Err(e) if e.is_transient() && attempt < self.config.max_feedback_retries => {
                    attempt += 1;
                    let wait = e.retry_after().unwrap_or(delay).min(MAX_RETRY_DELAY);
                    warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "feedback provider unavailable, retrying: {e}"
                    );
                    tokio::time::sleep(wait).await;
                    delay = delay.saturating_mul(2).min(MAX_RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn persist(&self, record: &SubmissionRecord) -> Result<Uuid, ScoringError> {
        let row = record.to_row().map_err(ScoringError::persistence)?;
        let stored = self
            .store
            .insert(Table::for_task(record.task_type), row)
            .await
            .map_err(ScoringError::persistence)?;
        row_id(&stored).ok_or_else(|| {
            ScoringError::PersistenceFailure("store returned a record without an id".into())
        })
    }
}

fn validate_objective(response: &ObjectiveResponse) -> Result<(), ScoringError> {
    if response.total_questions == 0 {
        return Err(ScoringError::invalid("total questions must be greater than zero"));
    }
    if response.correct_answers.is_empty() {
        return Err(ScoringError::invalid("answer key is empty"));
    }
    let keyed = response.correct_answers.len();
    if keyed > response.total_questions as usize {
        return Err(ScoringError::invalid(format!(
            "answer key has {keyed} questions but the test has only {}",
            response.total_questions
        )));
    }
    Ok(())
}

fn validate_subjective(task: &SubjectiveTask) -> Result<TaskType, ScoringError> {
    let blank = |s: &str| s.trim().is_empty();
    match task {
        SubjectiveTask::Writing(writing) => {
            if blank(&writing.prompt) {
                return Err(ScoringError::invalid("writing prompt is empty"));
            }
            if blank(&writing.content) {
                return Err(ScoringError::invalid("essay is empty"));
            }
        }
        SubjectiveTask::Speaking(speaking) => {
            if blank(&speaking.question) {
                return Err(ScoringError::invalid("speaking question is empty"));
            }
            if blank(&speaking.transcript) {
                return Err(ScoringError::invalid("transcript is empty"));
            }
        }
    }
    task.task_type().ok_or_else(|| {
        ScoringError::invalid("speaking part number must be between 1 and 3")
    })
}
