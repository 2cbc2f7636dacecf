//! The `bandscore writing` and `bandscore speaking` commands.

use std::path::PathBuf;

use anyhow::Result;

use bandscore_core::model::{SpeakingTask, SubmissionType, WritingTask, WritingTaskNumber};

use super::{open_orchestrator, print_report, read_text};

pub async fn writing(
    task: WritingTaskNumber,
    prompt: String,
    essay_path: PathBuf,
    handwritten: bool,
    human_feedback: bool,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let content = read_text(&essay_path)?;
    let orchestrator = open_orchestrator(config, true)?;

    let report = orchestrator
        .submit_writing_essay(WritingTask {
            task,
            prompt,
            content,
            submission_type: if handwritten {
                SubmissionType::Handwritten
            } else {
                SubmissionType::Typed
            },
            human_feedback_requested: human_feedback,
        })
        .await?;
    print_report(&report, json)
}

pub async fn speaking(
    part: u8,
    question: String,
    transcript_path: PathBuf,
    duration: u32,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let transcript = read_text(&transcript_path)?;
    let orchestrator = open_orchestrator(config, true)?;

    let report = orchestrator
        .submit_speaking_recording(SpeakingTask {
            part_number: part,
            question,
            transcript,
            duration_secs: duration,
        })
        .await?;
    print_report(&report, json)
}
