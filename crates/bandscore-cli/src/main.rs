//! bandscore CLI: IELTS band scoring and feedback from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use bandscore_core::model::{ObjectiveSkill, Skill, TaskType, WritingTaskNumber};

mod commands;

#[derive(Parser)]
#[command(name = "bandscore", version, about = "IELTS band scoring and feedback")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a raw score to an IELTS band
    Band {
        /// Correct answers
        #[arg(long)]
        score: u32,

        /// Questions in the test
        #[arg(long)]
        total: u32,
    },

    /// Open a practice test session
    Session {
        /// writing, speaking, reading or listening
        #[arg(long)]
        skill: Skill,
    },

    /// Score a reading response (JSON or TOML answers file)
    Reading {
        #[arg(long)]
        answers: PathBuf,
    },

    /// Score a listening response (JSON or TOML answers file)
    Listening {
        #[arg(long)]
        answers: PathBuf,
    },

    /// Submit an essay for assessment
    Writing {
        /// Writing task: 1 or 2
        #[arg(long)]
        task: WritingTaskNumber,

        /// Task prompt the essay answers
        #[arg(long)]
        prompt: String,

        /// File containing the essay
        #[arg(long)]
        essay: PathBuf,

        /// Essay was handwritten and transcribed
        #[arg(long)]
        handwritten: bool,

        /// Request a human examiner review as well
        #[arg(long)]
        human_feedback: bool,
    },

    /// Submit a speaking transcript for assessment
    Speaking {
        /// Speaking part: 1, 2 or 3
        #[arg(long)]
        part: u8,

        /// Examiner question
        #[arg(long)]
        question: String,

        /// File containing the transcript
        #[arg(long)]
        transcript: PathBuf,

        /// Recording length in seconds
        #[arg(long, default_value = "0")]
        duration: u32,
    },

    /// Show a stored score report
    Show {
        /// Task type, e.g. writing_task2 or reading
        task_type: TaskType,
        /// Submission id
        id: uuid::Uuid,
    },

    /// Request fresh feedback for a stored writing or speaking submission
    Refresh {
        task_type: TaskType,
        id: uuid::Uuid,
    },

    /// Create a starter bandscore.toml
    Init,
}

#[tokio::main]
async fn main() {
    let filter = match "bandscore=info".parse() {
        Ok(directive) => tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        Err(_) => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;
    let json = cli.json;

    let result = match cli.command {
        Commands::Band { score, total } => commands::band::execute(score, total, json),
        Commands::Session { skill } => commands::session::execute(skill, config, json).await,
        Commands::Reading { answers } => {
            commands::objective::execute(ObjectiveSkill::Reading, answers, config, json).await
        }
        Commands::Listening { answers } => {
            commands::objective::execute(ObjectiveSkill::Listening, answers, config, json).await
        }
        Commands::Writing {
            task,
            prompt,
            essay,
            handwritten,
            human_feedback,
        } => {
            commands::subjective::writing(task, prompt, essay, handwritten, human_feedback, config, json)
                .await
        }
        Commands::Speaking {
            part,
            question,
            transcript,
            duration,
        } => commands::subjective::speaking(part, question, transcript, duration, config, json).await,
        Commands::Show { task_type, id } => commands::show::show(task_type, id, config, json).await,
        Commands::Refresh { task_type, id } => {
            commands::show::refresh(task_type, id, config, json).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
