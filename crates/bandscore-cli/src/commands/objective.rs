//! The `bandscore reading` and `bandscore listening` commands.

use std::path::PathBuf;

use anyhow::Result;

use bandscore_core::model::{ObjectiveResponse, ObjectiveSkill};

use super::{load_document, open_orchestrator, print_report};

pub async fn execute(
    skill: ObjectiveSkill,
    answers_path: PathBuf,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let response: ObjectiveResponse = load_document(&answers_path)?;
    let orchestrator = open_orchestrator(config, false)?;

    let report = match skill {
        ObjectiveSkill::Reading => orchestrator.submit_reading_response(response).await?,
        ObjectiveSkill::Listening => orchestrator.submit_listening_response(response).await?,
    };
    print_report(&report, json)
}
