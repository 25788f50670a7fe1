//! External AI collaborators.
//!
//! The service never talks to a speech or language vendor directly; it
//! exchanges fixed shapes with collaborator services over NATS:
//! audio in / transcript + segments out, question + transcript in /
//! rubric feedback out, topic or resume text in / question list out.
//! Resume text extraction is the one collaborator that runs in-process
//! (`extract`).

mod extract;
mod nats;
mod traits;

pub use extract::{extract_text, ExtractError};
pub use nats::{AudioMessage, NatsCollaborator, QuestionRequest, ScoreRequest, TranscriptReply};
pub use traits::{
    parse_feedback, parse_questions, QuestionGenerator, QuestionSource, ScoreOutcome, Scorer,
    TranscriptSegment, Transcriber, Transcription,
};
