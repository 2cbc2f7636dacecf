//! The `bandscore session` command.

use std::path::PathBuf;

use anyhow::Result;

use bandscore_core::model::Skill;

use super::open_orchestrator;

pub async fn execute(skill: Skill, config: Option<PathBuf>, json: bool) -> Result<()> {
    let orchestrator = open_orchestrator(config, false)?;
    let session = orchestrator.create_test_session(skill).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "Started {} session {} at {}",
            session.test_type,
            session.id,
            session.started_at.to_rfc3339()
        );
    }
    Ok(())
}
