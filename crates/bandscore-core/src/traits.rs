//! Core trait definitions for feedback providers and record stores.
//!
//! These async traits are implemented by the `bandscore-providers` and
//! `bandscore-store` crates respectively, and injected into the
//! orchestrator at construction time.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::FeedbackError;
use crate::model::{Skill, SubjectiveTask, TaskType};
use crate::results::FeedbackPayload;

// ---------------------------------------------------------------------------
// Feedback provider trait
// ---------------------------------------------------------------------------

/// A backend that assesses writing and speaking responses.
#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Assess one subjective task.
    ///
    /// Implementations return normalized scores and never invent feedback:
    /// any failure is reported, and the caller decides on fallback.
    async fn assess(&self, task: &SubjectiveTask) -> Result<FeedbackPayload, FeedbackError>;
}

// ---------------------------------------------------------------------------
// Record store trait
// ---------------------------------------------------------------------------

/// A persisted row: a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// Column holding the row id assigned by the store.
pub const ID_COLUMN: &str = "id";

/// Tables the scoring core reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    WritingSubmissions,
    SpeakingRecordings,
    ReadingResponses,
    ListeningResponses,
    TestSessions,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::WritingSubmissions,
        Table::SpeakingRecordings,
        Table::ReadingResponses,
        Table::ListeningResponses,
        Table::TestSessions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::WritingSubmissions => "writing_submissions",
            Table::SpeakingRecordings => "speaking_recordings",
            Table::ReadingResponses => "reading_responses",
            Table::ListeningResponses => "listening_responses",
            Table::TestSessions => "test_sessions",
        }
    }

    /// The table submissions of `task_type` are stored in.
    pub fn for_task(task_type: TaskType) -> Table {
        match task_type.skill() {
            Skill::Writing => Table::WritingSubmissions,
            Skill::Speaking => Table::SpeakingRecordings,
            Skill::Reading => Table::ReadingResponses,
            Skill::Listening => Table::ListeningResponses,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append/update-by-id persistence for submission records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert `row`, returning it with a freshly assigned `id` column.
    async fn insert(&self, table: Table, row: Row) -> anyhow::Result<Row>;

    /// Merge `patch` into the row with `id`. Fails if no such row exists.
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> anyhow::Result<()>;

    /// Fetch the row with `id`, or `None` if it does not exist.
    async fn select(&self, table: Table, id: Uuid) -> anyhow::Result<Option<Row>>;
}

/// Read the store-assigned id from a row.
pub fn row_id(row: &Row) -> Option<Uuid> {
    row.get(ID_COLUMN)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}
