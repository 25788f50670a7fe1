use serde::{Deserialize, Serialize};

/// One completed practice run, as persisted by the session store.
///
/// The four per-question sequences are index-aligned: slot `i` of
/// `answers`, `transcripts` and `feedback` all belong to question `i`.
/// An unspoken answer is an empty blob and an empty transcript, never
/// a missing slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Store-assigned identity, monotonically increasing
    pub id: i64,

    /// Milliseconds since epoch, stamped when the record was saved
    pub timestamp: i64,

    /// Interview questions, in the order they were asked
    pub questions: Vec<String>,

    /// Recorded answer audio, one opaque blob per question
    pub answers: Vec<Vec<u8>>,

    /// Transcripts, one per question (empty = no speech captured)
    pub transcripts: Vec<String>,

    /// Per-question evaluation; `None` = not evaluated
    pub feedback: Vec<Option<Feedback>>,
}

/// Rubric scores for a single answer, produced by the scoring
/// collaborator and stored verbatim. Sub-scores are conventionally in
/// the 0-10 range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub content: f64,
    pub structure: f64,
    pub clarity: f64,
    pub delivery: f64,
    #[serde(default)]
    pub tips: Vec<FeedbackTip>,
}

/// A free-text improvement suggestion with a reference into the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTip {
    pub tip: String,
    pub snippet: String,
}

impl Feedback {
    /// Sum of the four sub-scores.
    pub fn score_sum(&self) -> f64 {
        self.content + self.structure + self.clarity + self.delivery
    }
}

impl SessionRecord {
    /// Whether the four per-question sequences agree in length.
    pub fn is_aligned(&self) -> bool {
        let n = self.questions.len();
        self.answers.len() == n && self.transcripts.len() == n && self.feedback.len() == n
    }

    /// Bring a drifted feedback sequence back to the question count.
    /// A crash mid-evaluation can leave it short; missing slots become
    /// `None`, surplus slots are dropped.
    pub fn repair_feedback(&mut self) {
        self.feedback.resize(self.questions.len(), None);
    }
}
