//! Core data model types for bandscore.
//!
//! These are the inputs the scoring system accepts: task types, the
//! subjective task contexts sent for feedback, and objective answer sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mapping from question id to answer text.
pub type AnswerSet = BTreeMap<String, String>;

/// The IELTS skill a test exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Writing,
    Speaking,
    Reading,
    Listening,
}

impl Skill {
    /// Reading and listening are scored locally against an answer key.
    pub fn is_objective(self) -> bool {
        matches!(self, Skill::Reading | Skill::Listening)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skill::Writing => write!(f, "writing"),
            Skill::Speaking => write!(f, "speaking"),
            Skill::Reading => write!(f, "reading"),
            Skill::Listening => write!(f, "listening"),
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "writing" => Ok(Skill::Writing),
            "speaking" => Ok(Skill::Speaking),
            "reading" => Ok(Skill::Reading),
            "listening" => Ok(Skill::Listening),
            other => Err(format!("unknown skill: {other}")),
        }
    }
}

/// Every task a submission can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    WritingTask1,
    WritingTask2,
    SpeakingPart1,
    SpeakingPart2,
    SpeakingPart3,
    Reading,
    Listening,
}

impl TaskType {
    pub fn skill(self) -> Skill {
        match self {
            TaskType::WritingTask1 | TaskType::WritingTask2 => Skill::Writing,
            TaskType::SpeakingPart1 | TaskType::SpeakingPart2 | TaskType::SpeakingPart3 => {
                Skill::Speaking
            }
            TaskType::Reading => Skill::Reading,
            TaskType::Listening => Skill::Listening,
        }
    }

    pub fn is_objective(self) -> bool {
        self.skill().is_objective()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskType::WritingTask1 => "writing_task1",
            TaskType::WritingTask2 => "writing_task2",
            TaskType::SpeakingPart1 => "speaking_part1",
            TaskType::SpeakingPart2 => "speaking_part2",
            TaskType::SpeakingPart3 => "speaking_part3",
            TaskType::Reading => "reading",
            TaskType::Listening => "listening",
        };
        f.write_str(name)
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "writing_task1" => Ok(TaskType::WritingTask1),
            "writing_task2" => Ok(TaskType::WritingTask2),
            "speaking_part1" => Ok(TaskType::SpeakingPart1),
            "speaking_part2" => Ok(TaskType::SpeakingPart2),
            "speaking_part3" => Ok(TaskType::SpeakingPart3),
            "reading" => Ok(TaskType::Reading),
            "listening" => Ok(TaskType::Listening),
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

/// Which of the two writing tasks an essay answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingTaskNumber {
    Task1,
    Task2,
}

impl fmt::Display for WritingTaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritingTaskNumber::Task1 => write!(f, "task1"),
            WritingTaskNumber::Task2 => write!(f, "task2"),
        }
    }
}

impl FromStr for WritingTaskNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task1" | "1" => Ok(WritingTaskNumber::Task1),
            "task2" | "2" => Ok(WritingTaskNumber::Task2),
            other => Err(format!("unknown writing task: {other}")),
        }
    }
}

/// How the essay was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    #[default]
    Typed,
    Handwritten,
}

/// A writing essay awaiting assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingTask {
    pub task: WritingTaskNumber,
    /// The task prompt the candidate answered.
    pub prompt: String,
    /// The essay text.
    pub content: String,
    #[serde(default)]
    pub submission_type: SubmissionType,
    #[serde(default)]
    pub human_feedback_requested: bool,
}

impl WritingTask {
    pub fn task_type(&self) -> TaskType {
        match self.task {
            WritingTaskNumber::Task1 => TaskType::WritingTask1,
            WritingTaskNumber::Task2 => TaskType::WritingTask2,
        }
    }

    pub fn word_count(&self) -> u32 {
        crate::scorer::word_count(&self.content)
    }
}

/// A speaking response, already transcribed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakingTask {
    /// Speaking test part, 1 to 3.
    pub part_number: u8,
    pub question: String,
    pub transcript: String,
    /// Recording length in seconds.
    pub duration_secs: u32,
}

impl SpeakingTask {
    /// `None` when the part number is outside 1..=3.
    pub fn task_type(&self) -> Option<TaskType> {
        match self.part_number {
            1 => Some(TaskType::SpeakingPart1),
            2 => Some(TaskType::SpeakingPart2),
            3 => Some(TaskType::SpeakingPart3),
            _ => None,
        }
    }
}

/// Context for a task whose score is delegated to a feedback provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum SubjectiveTask {
    Writing(WritingTask),
    Speaking(SpeakingTask),
}

impl SubjectiveTask {
    pub fn skill(&self) -> Skill {
        match self {
            SubjectiveTask::Writing(_) => Skill::Writing,
            SubjectiveTask::Speaking(_) => Skill::Speaking,
        }
    }

    pub fn task_type(&self) -> Option<TaskType> {
        match self {
            SubjectiveTask::Writing(task) => Some(task.task_type()),
            SubjectiveTask::Speaking(task) => task.task_type(),
        }
    }
}

/// Which objective test an answer set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSkill {
    Reading,
    Listening,
}

impl ObjectiveSkill {
    pub fn task_type(self) -> TaskType {
        match self {
            ObjectiveSkill::Reading => TaskType::Reading,
            ObjectiveSkill::Listening => TaskType::Listening,
        }
    }
}

/// Answers submitted for a reading or listening test, with the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveResponse {
    #[serde(default)]
    pub test_id: Option<String>,
    pub answers: AnswerSet,
    pub correct_answers: AnswerSet,
    pub total_questions: u32,
}

/// A practice session opened when a candidate starts a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub id: Uuid,
    pub test_type: Skill,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_display_and_parse() {
        assert_eq!(TaskType::WritingTask1.to_string(), "writing_task1");
        assert_eq!(TaskType::SpeakingPart3.to_string(), "speaking_part3");
        assert_eq!(
            "Speaking_Part2".parse::<TaskType>().unwrap(),
            TaskType::SpeakingPart2
        );
        assert_eq!("reading".parse::<TaskType>().unwrap(), TaskType::Reading);
        assert!("writing_task3".parse::<TaskType>().is_err());
    }

    #[test]
    fn task_type_serde_matches_display() {
        for task in [
            TaskType::WritingTask1,
            TaskType::WritingTask2,
            TaskType::SpeakingPart1,
            TaskType::SpeakingPart2,
            TaskType::SpeakingPart3,
            TaskType::Reading,
            TaskType::Listening,
        ] {
            let json = serde_json::to_string(&task).unwrap();
            assert_eq!(json, format!("\"{task}\""));
        }
    }

    #[test]
    fn skills_split_objective_and_subjective() {
        assert!(TaskType::Reading.is_objective());
        assert!(TaskType::Listening.is_objective());
        assert!(!TaskType::WritingTask2.is_objective());
        assert_eq!(TaskType::SpeakingPart2.skill(), Skill::Speaking);
        assert!("math".parse::<Skill>().is_err());
    }

    #[test]
    fn speaking_part_out_of_range_has_no_task_type() {
        let task = SpeakingTask {
            part_number: 4,
            question: "q".into(),
            transcript: "t".into(),
            duration_secs: 60,
        };
        assert_eq!(task.task_type(), None);
    }

    #[test]
    fn subjective_task_is_tagged_by_category() {
        let task = SubjectiveTask::Writing(WritingTask {
            task: WritingTaskNumber::Task2,
            prompt: "Discuss both views.".into(),
            content: "Some people believe".into(),
            submission_type: SubmissionType::Typed,
            human_feedback_requested: false,
        });
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["category"], "writing");
        assert_eq!(json["task"], "task2");
        let back: SubjectiveTask = serde_json::from_value(json).unwrap();
        assert_eq!(back.task_type(), Some(TaskType::WritingTask2));
    }
}
