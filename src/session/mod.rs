//! Practice session lifecycle and data model
//!
//! This module provides:
//! - `SessionRecord` / `Feedback`, the persisted shape of one completed
//!   run, with the slot-alignment contract between questions, answers,
//!   transcripts and feedback
//! - `PracticeRun`, the live run that accumulates answers and persists
//!   exactly once at finish
//! - the built-in question bank used when no generated set is available

pub mod bank;
mod practice;
mod record;

pub use practice::PracticeRun;
pub use record::{Feedback, FeedbackTip, SessionRecord};
