//! bandscore-core: Band scoring, feedback contract, and submission orchestration.
//!
//! This crate defines the data model, the objective scorer and band
//! converter, the feedback provider contract with its fallback content, and
//! the orchestrator that ties them to a record store.

pub mod band;
pub mod error;
pub mod fallback;
pub mod feedback;
pub mod model;
pub mod orchestrator;
pub mod record;
pub mod results;
pub mod scorer;
pub mod state;
pub mod traits;

pub use error::{FeedbackError, ScoringError};
pub use orchestrator::{OrchestratorConfig, SubmissionOrchestrator};
