//! Mock provider for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use bandscore_core::feedback::parse_feedback;
use bandscore_core::model::SubjectiveTask;
use bandscore_core::results::FeedbackPayload;
use bandscore_core::traits::FeedbackProvider;
use bandscore_core::FeedbackError;

type Outcome = Result<String, FeedbackError>;

/// A mock feedback provider for exercising the orchestrator without real API calls.
///
/// Replies are raw model text and go through the same parser as a real
/// provider, so malformed replies behave exactly as they would in production.
pub struct MockFeedbackProvider {
    /// Outcomes consumed in order before falling back to `default_outcome`.
    script: Mutex<VecDeque<Outcome>>,
    default_outcome: Outcome,
    call_count: AtomicU32,
    last_task: Mutex<Option<SubjectiveTask>>,
}

impl MockFeedbackProvider {
    /// Create a mock that always returns the same raw reply.
    pub fn with_fixed_reply(reply: &str) -> Self {
        Self::scripted(Vec::new(), Ok(reply.to_string()))
    }

    /// Create a mock that always fails with `error`.
    pub fn failing(error: FeedbackError) -> Self {
        Self::scripted(Vec::new(), Err(error))
    }

    /// Create a mock that plays `outcomes` in order, then repeats `default_outcome`.
    pub fn scripted(outcomes: Vec<Outcome>, default_outcome: Outcome) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            default_outcome,
            call_count: AtomicU32::new(0),
            last_task: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last task this provider assessed.
    pub fn last_task(&self) -> Option<SubjectiveTask> {
        lock(&self.last_task).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl FeedbackProvider for MockFeedbackProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn assess(&self, task: &SubjectiveTask) -> Result<FeedbackPayload, FeedbackError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *lock(&self.last_task) = Some(task.clone());

        let outcome = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.default_outcome.clone());
        parse_feedback(task, &outcome?)
    }
}
