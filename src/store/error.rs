use thiserror::Error;

/// Errors surfaced by the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened: missing permissions, an
    /// unusable path, or an open that did not finish within the
    /// deadline. Not retryable without intervention.
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    /// A read-write transaction was rejected (quota, corruption).
    #[error("session store write failed: {0}")]
    WriteFailed(#[source] rusqlite::Error),

    /// A read-only transaction failed.
    #[error("session store read failed: {0}")]
    ReadFailed(#[source] rusqlite::Error),

    /// The record sequences disagree in length; questions, answers,
    /// transcripts and feedback must align slot-for-slot.
    #[error(
        "misaligned session record: {questions} questions, {answers} answers, \
         {transcripts} transcripts, {feedback} feedback entries"
    )]
    Misaligned {
        questions: usize,
        answers: usize,
        transcripts: usize,
        feedback: usize,
    },

    /// A stored column could not be serialized or deserialized.
    #[error("session record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blocking database task was cancelled or panicked.
    #[error("session store task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}
