//! The `bandscore show` and `bandscore refresh` commands.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use bandscore_core::model::TaskType;

use super::{open_orchestrator, print_report};

pub async fn show(task_type: TaskType, id: Uuid, config: Option<PathBuf>, json: bool) -> Result<()> {
    let orchestrator = open_orchestrator(config, false)?;
    let report = orchestrator.load_report(task_type, id).await?;
    print_report(&report, json)
}

pub async fn refresh(
    task_type: TaskType,
    id: Uuid,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let orchestrator = open_orchestrator(config, !task_type.is_objective())?;
    let report = orchestrator.refresh_feedback(task_type, id).await?;
    print_report(&report, json)
}
