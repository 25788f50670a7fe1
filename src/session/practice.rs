use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use super::bank;
use super::record::Feedback;
use crate::collab::{ScoreOutcome, Scorer, Transcriber};
use crate::store::SessionStore;

/// How many questions a default run draws from the built-in bank.
const DEFAULT_QUESTION_COUNT: usize = 10;

/// Audio and transcript captured for one question slot.
#[derive(Debug, Clone, Default)]
struct AnswerSlot {
    audio: Vec<u8>,
    transcript: String,
}

/// A live practice run: one slot per question, filled front to back as
/// the candidate answers, evaluated and persisted exactly once at
/// `finish`. There is no partial persistence; an abandoned run leaves
/// no trace in the store.
pub struct PracticeRun {
    run_id: String,
    questions: Vec<String>,
    slots: Vec<AnswerSlot>,
    cursor: usize,
}

impl PracticeRun {
    /// Start a run over the given questions with a fresh correlation id.
    pub fn new(questions: Vec<String>) -> Self {
        Self::with_run_id(format!("run-{}", uuid::Uuid::new_v4()), questions)
    }

    /// Start a run with an explicit correlation id.
    pub fn with_run_id(run_id: impl Into<String>, questions: Vec<String>) -> Self {
        let run_id = run_id.into();
        info!("Starting practice run {} ({} questions)", run_id, questions.len());

        let slots = vec![AnswerSlot::default(); questions.len()];
        Self {
            run_id,
            questions,
            slots,
            cursor: 0,
        }
    }

    /// Start a run over questions sampled from the built-in bank.
    pub fn with_default_questions() -> Self {
        Self::new(bank::fallback_questions(DEFAULT_QUESTION_COUNT))
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// The question awaiting an answer, if any remain.
    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.cursor).map(String::as_str)
    }

    /// Whether every question has been answered or skipped.
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.questions.len()
    }

    /// Record the audio for the current question and obtain its
    /// transcript. A transcription failure is tolerated: the slot keeps
    /// its audio with an empty transcript and the run moves on.
    ///
    /// Returns the transcript (possibly empty).
    pub async fn submit_answer(
        &mut self,
        audio: Vec<u8>,
        transcriber: &dyn Transcriber,
    ) -> Result<String> {
        if self.is_complete() {
            bail!("practice run {} has no remaining question slots", self.run_id);
        }

        let transcript = if audio.is_empty() {
            String::new()
        } else {
            match transcriber.transcribe(&self.run_id, &audio).await {
                Ok(transcription) => transcription.transcript,
                Err(e) => {
                    warn!(
                        "Transcription failed for question {} of run {}: {}",
                        self.cursor + 1,
                        self.run_id,
                        e
                    );
                    String::new()
                }
            }
        };

        self.slots[self.cursor] = AnswerSlot {
            audio,
            transcript: transcript.clone(),
        };
        self.cursor += 1;

        Ok(transcript)
    }

    /// Leave the current question unanswered (empty blob, empty
    /// transcript) and move on.
    pub fn skip_answer(&mut self) {
        if self.cursor < self.questions.len() {
            self.cursor += 1;
        }
    }

    /// Evaluate every answered question and persist the completed run,
    /// consuming it. Slots without a transcript are never sent for
    /// scoring and store `None` feedback; a malformed or failed
    /// evaluation stores `None` for that slot only, so one bad
    /// evaluation cannot block persisting the rest.
    ///
    /// Returns the store-assigned session id.
    pub async fn finish(self, scorer: &dyn Scorer, store: &SessionStore) -> Result<i64> {
        info!("Evaluating practice run {}", self.run_id);

        let mut feedback: Vec<Option<Feedback>> = Vec::with_capacity(self.questions.len());
        for (i, (question, slot)) in self.questions.iter().zip(&self.slots).enumerate() {
            if slot.transcript.is_empty() {
                feedback.push(None);
                continue;
            }

            match scorer.score(question, &slot.transcript).await {
                Ok(ScoreOutcome::Feedback(scores)) => feedback.push(Some(scores)),
                Ok(ScoreOutcome::Malformed { raw }) => {
                    warn!(
                        "Unparseable feedback for question {} of run {}: {}",
                        i + 1,
                        self.run_id,
                        raw
                    );
                    feedback.push(None);
                }
                Err(e) => {
                    warn!(
                        "Scoring failed for question {} of run {}: {}",
                        i + 1,
                        self.run_id,
                        e
                    );
                    feedback.push(None);
                }
            }
        }

        let (answers, transcripts) = self
            .slots
            .into_iter()
            .map(|slot| (slot.audio, slot.transcript))
            .unzip();

        let id = store
            .save(self.questions, answers, transcripts, Some(feedback))
            .await
            .context("Failed to save practice session")?;

        info!("Practice run {} saved as session {}", self.run_id, id);

        Ok(id)
    }
}
