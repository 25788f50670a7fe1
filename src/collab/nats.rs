use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::traits::{
    parse_feedback, parse_questions, QuestionGenerator, QuestionSource, ScoreOutcome, Scorer,
    TranscriptSegment, Transcriber, Transcription,
};

/// Generated question sets are capped at this size, whatever the
/// collaborator returns.
const MAX_GENERATED_QUESTIONS: usize = 10;

/// Wire message carrying one answer's audio to the STT service.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioMessage {
    pub run_id: String,
    /// Base64-encoded audio blob
    pub audio: String,
    /// RFC3339 timestamp
    pub timestamp: String,
}

/// Transcript reply from the STT service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptReply {
    pub run_id: String,
    pub transcript: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// Scoring request for one answered question.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub question: String,
    pub transcript: String,
}

/// Question-generation request.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub topic: Option<String>,
    pub resume_text: Option<String>,
}

/// NATS-backed implementation of the collaborator seams.
///
/// Transcription is publish/subscribe with per-run subjects
/// (`stt.audio.<run_id>` out, `stt.text.<run_id>` back); scoring and
/// question generation are request/reply on fixed subjects. Every
/// round-trip is bounded by `request_timeout`.
pub struct NatsCollaborator {
    client: async_nats::Client,
    request_timeout: Duration,
}

impl NatsCollaborator {
    /// Connect to the collaborator bus.
    pub async fn connect(url: &str, request_timeout: Duration) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            request_timeout,
        })
    }
}

#[async_trait::async_trait]
impl Transcriber for NatsCollaborator {
    async fn transcribe(&self, run_id: &str, audio: &[u8]) -> Result<Transcription> {
        let audio_subject = format!("stt.audio.{}", run_id);
        let text_subject = format!("stt.text.{}", run_id);

        // Subscribe before publishing so the reply cannot race past us
        let mut subscriber = self
            .client
            .subscribe(text_subject)
            .await
            .context("Failed to subscribe to transcripts")?;

        let message = AudioMessage {
            run_id: run_id.to_string(),
            audio: base64::engine::general_purpose::STANDARD.encode(audio),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(audio_subject, payload.into())
            .await
            .context("Failed to publish audio for transcription")?;

        let reply = tokio::time::timeout(self.request_timeout, async {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<TranscriptReply>(&msg.payload) {
                    Ok(reply) if reply.run_id == run_id => return Some(reply),
                    Ok(other) => {
                        // Stray traffic for another run; keep waiting
                        warn!(
                            "Ignoring transcript for run {} while waiting on {}",
                            other.run_id, run_id
                        );
                    }
                    Err(e) => {
                        warn!("Failed to parse transcript message: {}", e);
                    }
                }
            }
            None
        })
        .await
        .context("Timed out waiting for a transcript")?
        .context("Transcript subscription closed without a reply")?;

        Ok(Transcription {
            transcript: reply.transcript,
            segments: reply.segments,
        })
    }
}

#[async_trait::async_trait]
impl Scorer for NatsCollaborator {
    async fn score(&self, question: &str, transcript: &str) -> Result<ScoreOutcome> {
        let request = ScoreRequest {
            question: question.to_string(),
            transcript: transcript.to_string(),
        };
        let payload = serde_json::to_vec(&request)?;

        let reply = tokio::time::timeout(
            self.request_timeout,
            self.client.request("eval.answer", payload.into()),
        )
        .await
        .context("Timed out waiting for feedback")?
        .context("Scoring request failed")?;

        let raw = String::from_utf8_lossy(&reply.payload);
        Ok(parse_feedback(&raw))
    }
}

#[async_trait::async_trait]
impl QuestionGenerator for NatsCollaborator {
    async fn generate(&self, source: &QuestionSource) -> Result<Vec<String>> {
        let request = QuestionRequest {
            topic: source.topic.clone(),
            resume_text: source.resume_text.clone(),
        };
        let payload = serde_json::to_vec(&request)?;

        let reply = tokio::time::timeout(
            self.request_timeout,
            self.client.request("eval.questions", payload.into()),
        )
        .await
        .context("Timed out waiting for generated questions")?
        .context("Question generation request failed")?;

        let mut questions = parse_questions(&String::from_utf8_lossy(&reply.payload));
        questions.truncate(MAX_GENERATED_QUESTIONS);

        Ok(questions)
    }
}
