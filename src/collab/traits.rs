use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::Feedback;

/// A transcript with time-aligned segments, as returned by the
/// speech-to-text collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    pub transcript: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// One time-aligned piece of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Segment start, seconds from the beginning of the answer
    pub start: f64,
    /// Segment end, seconds from the beginning of the answer
    pub end: f64,
}

/// Outcome of one scoring request. The scorer replies with free-form
/// model output; a reply that does not contain a feedback object is
/// carried as `Malformed` so downstream code never re-guards against
/// arbitrary shapes.
#[derive(Debug, Clone)]
pub enum ScoreOutcome {
    Feedback(Feedback),
    Malformed { raw: String },
}

/// What to generate interview questions from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSource {
    /// Topic or role the candidate is preparing for
    pub topic: Option<String>,
    /// Raw resume text extracted from an upload
    pub resume_text: Option<String>,
}

/// Speech-to-text collaborator: audio in, transcript out.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one recorded answer. `run_id` correlates the request
    /// with its reply on the collaborator bus.
    async fn transcribe(&self, run_id: &str, audio: &[u8]) -> Result<Transcription>;
}

/// Rubric-scoring collaborator: question + transcript in, feedback out.
#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, question: &str, transcript: &str) -> Result<ScoreOutcome>;
}

/// Interview-question generation collaborator.
#[async_trait::async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, source: &QuestionSource) -> Result<Vec<String>>;
}

/// Extract the first JSON object from a model reply and parse it as
/// feedback. Model output often wraps the object in prose, so scan for
/// the outermost braces before parsing.
pub fn parse_feedback(raw: &str) -> ScoreOutcome {
    let candidate = match (raw.find('{'), raw.rfind('}')) {
        (Some(open), Some(close)) if open < close => &raw[open..=close],
        _ => raw,
    };

    match serde_json::from_str::<Feedback>(candidate) {
        Ok(feedback) => ScoreOutcome::Feedback(feedback),
        Err(_) => ScoreOutcome::Malformed {
            raw: raw.to_string(),
        },
    }
}

/// Parse a question-generation reply. Accepts a JSON array, a
/// `{"questions": [...]}` wrapper, or falls back to one question per
/// line with list markers stripped.
pub fn parse_questions(raw: &str) -> Vec<String> {
    if let Ok(questions) = serde_json::from_str::<Vec<String>>(raw) {
        return questions;
    }

    #[derive(Deserialize)]
    struct Wrapped {
        questions: Vec<String>,
    }
    if let Ok(wrapped) = serde_json::from_str::<Wrapped>(raw) {
        return wrapped.questions;
    }

    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || "-.)".contains(c))
                .trim_start()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
