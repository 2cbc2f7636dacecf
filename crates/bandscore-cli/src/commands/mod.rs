//! Subcommand implementations and the plumbing they share.

pub mod band;
pub mod init;
pub mod objective;
pub mod session;
pub mod show;
pub mod subjective;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use comfy_table::{Cell, Table};
use serde::de::DeserializeOwned;

use bandscore_core::model::SubjectiveTask;
use bandscore_core::results::{FeedbackPayload, ScoreReport, ScoringStatus};
use bandscore_core::traits::FeedbackProvider;
use bandscore_core::{FeedbackError, SubmissionOrchestrator};
use bandscore_providers::config::load_config_from;
use bandscore_store::JsonFileStore;

/// Build an orchestrator over the configured data directory.
///
/// Commands that never ask for feedback run without a configured provider.
pub(crate) fn open_orchestrator(
    config_path: Option<PathBuf>,
    needs_feedback: bool,
) -> Result<SubmissionOrchestrator> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonFileStore::open(&config.data_dir)?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        provider = %config.default_provider,
        "opened record store"
    );

    let provider: Arc<dyn FeedbackProvider> = if needs_feedback {
        config.default_feedback_provider()?
    } else {
        match config.default_feedback_provider() {
            Ok(provider) => provider,
            Err(_) => Arc::new(NoProvider),
        }
    };

    Ok(SubmissionOrchestrator::new(
        provider,
        Arc::new(store),
        config.orchestrator_config(),
    ))
}

struct NoProvider;

#[async_trait]
impl FeedbackProvider for NoProvider {
    fn name(&self) -> &str {
        "none"
    }

    async fn assess(&self, _task: &SubjectiveTask) -> Result<FeedbackPayload, FeedbackError> {
        Err(FeedbackError::permanent("no feedback provider configured"))
    }
}

/// Read a JSON or TOML document, chosen by file extension.
pub(crate) fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn print_report(report: &ScoreReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Submission"), Cell::new(report.submission_id)]);
    table.add_row(vec![Cell::new("Task"), Cell::new(report.task_type)]);
    let status = match report.status {
        ScoringStatus::Scored => "scored",
        ScoringStatus::FallbackScored => "fallback_scored",
    };
    table.add_row(vec![Cell::new("Status"), Cell::new(status)]);
    if report.task_type.is_objective() {
        table.add_row(vec![
            Cell::new("Score"),
            Cell::new(format!("{}/{}", report.score, report.total_questions)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Band"),
        Cell::new(format!("{:.1}", report.band_score)),
    ]);
    if let Some(words) = report.word_count {
        table.add_row(vec![Cell::new("Words"), Cell::new(words)]);
    }
    for (criterion, score) in report.feedback.criteria() {
        table.add_row(vec![Cell::new(criterion), Cell::new(format!("{score:.1}"))]);
    }

    let commentary = report.feedback.commentary();
    for (label, items) in [
        ("Strengths", &commentary.strengths),
        ("Improvements", &commentary.improvements),
        ("Suggestions", &commentary.suggestions),
    ] {
        table.add_row(vec![Cell::new(label), Cell::new(items.join("\n"))]);
    }

    println!("{table}");
    if report.is_fallback() {
        eprintln!("Feedback provider was unavailable; showing general guidance. Retry with `bandscore refresh`.");
    }
    Ok(())
}
