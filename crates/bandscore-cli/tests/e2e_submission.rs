//! End-to-end submission tests wiring the orchestrator to real stores.
//!
//! These tests verify the full submission flow (validate → score or assess →
//! persist → read back) against both store backends.

use std::sync::Arc;
use std::time::Duration;

use bandscore_core::fallback::NEUTRAL_BAND;
use bandscore_core::model::{
    AnswerSet, ObjectiveResponse, Skill, SpeakingTask, SubmissionType, TaskType, WritingTask,
    WritingTaskNumber,
};
use bandscore_core::results::{FeedbackPayload, ScoringStatus};
use bandscore_core::traits::{RecordStore, Table};
use bandscore_core::{FeedbackError, OrchestratorConfig, ScoringError, SubmissionOrchestrator};
use bandscore_providers::mock::MockFeedbackProvider;
use bandscore_providers::openai::{GatewaySettings, OpenAiFeedbackProvider};
use bandscore_store::{JsonFileStore, MemoryStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WRITING_REPLY: &str = r#"Here is my assessment:
```json
{
  "band_score": 7.5,
  "task_response": 7,
  "coherence_cohesion": 8,
  "lexical_resource": 7.5,
  "grammatical_range": 7,
  "detailed_feedback": {"task_response": "All parts of the prompt are addressed."},
  "strengths": ["Clear position throughout"],
  "improvements": ["Some repetition of linking words"],
  "suggestions": ["Vary cohesive devices"]
}
```"#;

fn essay() -> WritingTask {
    WritingTask {
        task: WritingTaskNumber::Task2,
        prompt: "Some say technology makes people less social. Discuss.".into(),
        content: "Technology has changed how people interact in many ways.".into(),
        submission_type: SubmissionType::Typed,
        human_feedback_requested: false,
    }
}

fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn orchestrator(
    provider: Arc<MockFeedbackProvider>,
    store: Arc<dyn RecordStore>,
    retries: u32,
) -> SubmissionOrchestrator {
    SubmissionOrchestrator::new(
        provider,
        store,
        OrchestratorConfig {
            max_feedback_retries: retries,
            retry_delay: Duration::from_millis(1),
        },
    )
}

#[tokio::test]
async fn e2e_reading_against_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let provider = Arc::new(MockFeedbackProvider::failing(
        FeedbackError::unavailable("unused"),
    ));
    let orch = orchestrator(provider.clone(), store, 0);

    let report = orch
        .submit_reading_response(ObjectiveResponse {
            test_id: None,
            answers: answers(&[("1", "TRUE"), ("2", "A")]),
            correct_answers: answers(&[("1", "true"), ("2", "b")]),
            total_questions: 2,
        })
        .await
        .unwrap();

    assert_eq!(report.score, 1);
    assert_eq!(report.band_score, 5.0);
    assert_eq!(report.status, ScoringStatus::Scored);
    assert!(matches!(report.feedback, FeedbackPayload::Objective(_)));
    assert_eq!(provider.call_count(), 0);

    let reopened = orchestrator(
        provider,
        Arc::new(JsonFileStore::open(dir.path()).unwrap()),
        0,
    );
    let loaded = reopened
        .load_report(TaskType::Reading, report.submission_id)
        .await
        .unwrap();
    assert_eq!(loaded, report);
}

#[tokio::test]
async fn e2e_writing_with_fenced_reply() {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MockFeedbackProvider::with_fixed_reply(WRITING_REPLY));
    let orch = orchestrator(provider.clone(), store.clone(), 0);

    let report = orch.submit_writing_essay(essay()).await.unwrap();

    assert_eq!(report.status, ScoringStatus::Scored);
    assert_eq!(report.band_score, 7.5);
    assert_eq!(report.task_type, TaskType::WritingTask2);
    assert_eq!(report.word_count, Some(9));
    let FeedbackPayload::Writing(feedback) = &report.feedback else {
        panic!("expected writing feedback");
    };
    assert_eq!(feedback.coherence_cohesion, 8.0);
    assert_eq!(
        feedback.detailed_feedback.get("task_response").map(String::as_str),
        Some("All parts of the prompt are addressed.")
    );
    assert_eq!(store.len(Table::WritingSubmissions).await, 1);
    assert_eq!(provider.last_task().map(|t| t.skill()), Some(Skill::Writing));
}

#[tokio::test]
async fn e2e_speaking_fallback_then_refresh() {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MockFeedbackProvider::scripted(
        vec![Ok("I'd give this about a six.".into())],
        Ok(r#"{"band_score": 6, "fluency_coherence": 6, "pronunciation": 5.5, "lexical_resource": 6, "grammatical_range": 6.5, "strengths": ["Relevant"], "improvements": ["Hesitation"], "suggestions": ["Practise fillers"]}"#.into()),
    ));
    let orch = orchestrator(provider.clone(), store.clone(), 0);

    let report = orch
        .submit_speaking_recording(SpeakingTask {
            part_number: 2,
            question: "Describe a book you enjoyed.".into(),
            transcript: "The book I want to talk about is a mystery novel.".into(),
            duration_secs: 95,
        })
        .await
        .unwrap();
    assert_eq!(report.status, ScoringStatus::FallbackScored);
    assert_eq!(report.band_score, NEUTRAL_BAND);
    assert_eq!(report.task_type, TaskType::SpeakingPart2);

    let refreshed = orch
        .refresh_feedback(TaskType::SpeakingPart2, report.submission_id)
        .await
        .unwrap();
    assert_eq!(refreshed.status, ScoringStatus::Scored);
    assert_eq!(refreshed.band_score, 6.0);
    assert_eq!(refreshed.created_at, report.created_at);

    let loaded = orch
        .load_report(TaskType::SpeakingPart2, report.submission_id)
        .await
        .unwrap();
    assert_eq!(loaded, refreshed);
    assert_eq!(store.len(Table::SpeakingRecordings).await, 1);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn e2e_outage_retried_until_success() {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MockFeedbackProvider::scripted(
        vec![
            Err(FeedbackError::unavailable("HTTP 503")),
            Err(FeedbackError::unavailable("timed out")),
        ],
        Ok(WRITING_REPLY.into()),
    ));
    let orch = orchestrator(provider.clone(), store, 2);

    let report = orch.submit_writing_essay(essay()).await.unwrap();
    assert_eq!(report.status, ScoringStatus::Scored);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn e2e_invalid_input_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MockFeedbackProvider::with_fixed_reply(WRITING_REPLY));
    let orch = orchestrator(provider.clone(), store.clone(), 0);

    let err = orch
        .submit_listening_response(ObjectiveResponse {
            test_id: None,
            answers: answers(&[("1", "a")]),
            correct_answers: answers(&[("1", "a")]),
            total_questions: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidInput(_)));

    let err = orch
        .submit_writing_essay(WritingTask {
            content: "   ".into(),
            ..essay()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidInput(_)));

    assert!(store.is_empty().await);
    assert_eq!(provider.call_count(), 0);
}

fn openai_orchestrator(server: &MockServer, retries: u32, retry_delay: Duration) -> SubmissionOrchestrator {
    let provider = OpenAiFeedbackProvider::new(
        "sk-test",
        Some(server.uri()),
        None,
        GatewaySettings {
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
    )
    .unwrap();
    SubmissionOrchestrator::new(
        Arc::new(provider),
        Arc::new(MemoryStore::new()),
        OrchestratorConfig {
            max_feedback_retries: retries,
            retry_delay,
        },
    )
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn e2e_rejected_key_is_tried_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let orch = openai_orchestrator(&server, 3, Duration::from_millis(1));
    let report = orch.submit_writing_essay(essay()).await.unwrap();

    assert_eq!(report.status, ScoringStatus::FallbackScored);
    assert_eq!(report.band_score, NEUTRAL_BAND);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn e2e_rate_limit_waits_for_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(WRITING_REPLY)))
        .mount(&server)
        .await;

    // Backoff alone would wait 30s.
    let orch = openai_orchestrator(&server, 1, Duration::from_secs(30));
    let start = std::time::Instant::now();
    let report = orch.submit_writing_essay(essay()).await.unwrap();

    assert_eq!(report.status, ScoringStatus::Scored);
    assert_eq!(report.band_score, 7.5);
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
