//! The contract with the language-model feedback provider.
//!
//! Builds the examiner instructions for a subjective task and turns the
//! provider's reply back into a [`FeedbackPayload`]. Transport lives in
//! `bandscore-providers`; everything here is pure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::band::normalize_band;
use crate::error::FeedbackError;
use crate::model::{SpeakingTask, SubjectiveTask, WritingTask};
use crate::results::{Commentary, FeedbackPayload, SpeakingFeedback, WritingFeedback};

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// The system and user messages sent for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPrompt {
    pub system: String,
    pub user: String,
}

pub const WRITING_SYSTEM_PROMPT: &str = "You are an expert IELTS writing examiner. Assess responses strictly against the official IELTS band descriptors.

For Task 1 focus on task achievement, accuracy of the data described, the overview, and appropriate language.
For Task 2 focus on task response, clarity of position, development of ideas, and argumentation.

Give every score as a number between 1 and 9 in steps of 0.5 and reply with JSON only.";

pub const SPEAKING_SYSTEM_PROMPT: &str = "You are an expert IELTS speaking examiner. Assess responses against the official criteria: fluency and coherence, pronunciation, lexical resource, and grammatical range and accuracy.

Part 1 is personal questions, Part 2 an individual long turn, Part 3 a two-way discussion. Take the part into account.

Give every score as a number between 1 and 9 in steps of 0.5 and reply with JSON only.";

const WRITING_SCHEMA: &str = r#"{
  "band_score": number,
  "task_response": number,
  "coherence_cohesion": number,
  "lexical_resource": number,
  "grammatical_range": number,
  "detailed_feedback": {
    "task_response": "specific feedback",
    "coherence_cohesion": "specific feedback",
    "lexical_resource": "specific feedback",
    "grammatical_range": "specific feedback"
  },
  "strengths": ["strength1", "strength2", "strength3"],
  "improvements": ["improvement1", "improvement2", "improvement3"],
  "suggestions": ["suggestion1", "suggestion2", "suggestion3"]
}"#;

const SPEAKING_SCHEMA: &str = r#"{
  "band_score": number,
  "fluency_coherence": number,
  "pronunciation": number,
  "lexical_resource": number,
  "grammatical_range": number,
  "detailed_feedback": {
    "fluency_coherence": "specific feedback",
    "pronunciation": "specific feedback",
    "lexical_resource": "specific feedback",
    "grammatical_range": "specific feedback"
  },
  "strengths": ["strength1", "strength2", "strength3"],
  "improvements": ["improvement1", "improvement2", "improvement3"],
  "suggestions": ["suggestion1", "suggestion2", "suggestion3"]
}"#;

/// Build the instructions for assessing `task`.
pub fn build_prompt(task: &SubjectiveTask) -> FeedbackPrompt {
    match task {
        SubjectiveTask::Writing(writing) => build_writing_prompt(writing),
        SubjectiveTask::Speaking(speaking) => build_speaking_prompt(speaking),
    }
}

fn build_writing_prompt(task: &WritingTask) -> FeedbackPrompt {
    let user = format!(
        "Assess this IELTS Writing {task} response.

TASK PROMPT: {prompt}

CANDIDATE RESPONSE: {content}

WORD COUNT: {words}

Provide:
1. An overall band score
2. Scores for task achievement/response, coherence and cohesion, lexical resource, and grammatical range and accuracy
3. Specific feedback for each criterion
4. 3-4 key strengths
5. 3-4 areas for improvement
6. 3-4 actionable suggestions

Reply with JSON in exactly this shape:
{schema}",
        task = task.task.to_string().to_uppercase(),
        prompt = task.prompt.trim(),
        content = task.content.trim(),
        words = task.word_count(),
        schema = WRITING_SCHEMA,
    );
    FeedbackPrompt {
        system: WRITING_SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn build_speaking_prompt(task: &SpeakingTask) -> FeedbackPrompt {
    let user = format!(
        "Assess this IELTS Speaking Part {part} response.

QUESTION: {question}

TRANSCRIPT: {transcript}

DURATION: {duration} seconds

Provide:
1. An overall band score
2. Scores for fluency and coherence, pronunciation, lexical resource, and grammatical range and accuracy
3. Specific feedback for each criterion
4. 3-4 key strengths
5. 3-4 areas for improvement
6. 3-4 actionable suggestions

Reply with JSON in exactly this shape:
{schema}",
        part = task.part_number,
        question = task.question.trim(),
        transcript = task.transcript.trim(),
        duration = task.duration_secs,
        schema = SPEAKING_SCHEMA,
    );
    FeedbackPrompt {
        system: SPEAKING_SYSTEM_PROMPT.to_string(),
        user,
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawWritingFeedback {
    band_score: f64,
    task_response: f64,
    coherence_cohesion: f64,
    lexical_resource: f64,
    grammatical_range: f64,
    #[serde(default)]
    detailed_feedback: Option<Value>,
    strengths: Vec<String>,
    improvements: Vec<String>,
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct RawSpeakingFeedback {
    band_score: f64,
    fluency_coherence: f64,
    pronunciation: f64,
    lexical_resource: f64,
    grammatical_range: f64,
    #[serde(default)]
    detailed_feedback: Option<Value>,
    strengths: Vec<String>,
    improvements: Vec<String>,
    suggestions: Vec<String>,
}

/// Parse the provider's reply for `task` into a normalized payload.
///
/// Every score is clamped to `[1.0, 9.0]` and rounded to a half band. Prose,
/// missing fields, non-finite scores, and empty advice lists are all
/// reported as [`FeedbackError::MalformedProviderResponse`].
pub fn parse_feedback(task: &SubjectiveTask, content: &str) -> Result<FeedbackPayload, FeedbackError> {
    let json = extract_json_block(content);
    match task {
        SubjectiveTask::Writing(_) => {
            let raw: RawWritingFeedback = serde_json::from_str(json).map_err(malformed)?;
            Ok(FeedbackPayload::Writing(WritingFeedback {
                band_score: score("band_score", raw.band_score)?,
                task_response: score("task_response", raw.task_response)?,
                coherence_cohesion: score("coherence_cohesion", raw.coherence_cohesion)?,
                lexical_resource: score("lexical_resource", raw.lexical_resource)?,
                grammatical_range: score("grammatical_range", raw.grammatical_range)?,
                detailed_feedback: detail_map(raw.detailed_feedback),
                commentary: commentary(raw.strengths, raw.improvements, raw.suggestions)?,
            }))
        }
        SubjectiveTask::Speaking(_) => {
            let raw: RawSpeakingFeedback = serde_json::from_str(json).map_err(malformed)?;
            Ok(FeedbackPayload::Speaking(SpeakingFeedback {
                band_score: score("band_score", raw.band_score)?,
                fluency_coherence: score("fluency_coherence", raw.fluency_coherence)?,
                pronunciation: score("pronunciation", raw.pronunciation)?,
                lexical_resource: score("lexical_resource", raw.lexical_resource)?,
                grammatical_range: score("grammatical_range", raw.grammatical_range)?,
                detailed_feedback: detail_map(raw.detailed_feedback),
                commentary: commentary(raw.strengths, raw.improvements, raw.suggestions)?,
            }))
        }
    }
}

fn malformed(err: serde_json::Error) -> FeedbackError {
    FeedbackError::MalformedProviderResponse(format!("not the requested JSON shape: {err}"))
}

fn score(field: &str, value: f64) -> Result<f64, FeedbackError> {
    let normalized = normalize_band(value).ok_or_else(|| {
        FeedbackError::MalformedProviderResponse(format!("{field} is not a finite number"))
    })?;
    if normalized != value {
        tracing::debug!(field, value, normalized, "provider score normalized");
    }
    Ok(normalized)
}

fn commentary(
    strengths: Vec<String>,
    improvements: Vec<String>,
    suggestions: Vec<String>,
) -> Result<Commentary, FeedbackError> {
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    let commentary = Commentary {
        strengths: clean(strengths),
        improvements: clean(improvements),
        suggestions: clean(suggestions),
    };
    if !commentary.is_complete() {
        return Err(FeedbackError::MalformedProviderResponse(
            "strengths, improvements and suggestions must all be non-empty".into(),
        ));
    }
    Ok(commentary)
}

/// Keep the string-valued entries of the optional per-criterion comments.
fn detail_map(value: Option<Value>) -> BTreeMap<String, String> {
    match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) if !s.trim().is_empty() => Some((k, s)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Extract the JSON document from a provider reply.
///
/// Handles:
/// - A fenced ```json (or bare ```) block, possibly unclosed
/// - JSON surrounded by prose (first `{` to last `}`)
/// - A bare JSON reply (returned trimmed)
pub fn extract_json_block(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(fence) = trimmed.find("```") {
        let after = &trimmed[fence + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(after.len());
        let lang = after[..body_start].trim().to_lowercase();
        if lang.is_empty() || lang == "json" {
            let body = &after[body_start..];
            let body = match body.find("```") {
                Some(end) => &body[..end],
                None => body,
            };
            return body.trim();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
