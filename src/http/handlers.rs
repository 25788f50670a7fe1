use super::state::AppState;
use crate::analytics::{self, CategoryAverages, OverallStats};
use crate::collab::{extract_text, ExtractError, QuestionSource};
use crate::session::{bank, Feedback, SessionRecord};
use crate::store::StoreError;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// How many bank questions to serve when generation is unavailable.
const FALLBACK_QUESTION_COUNT: usize = 10;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SaveSessionRequest {
    pub questions: Vec<String>,

    /// Base64-encoded audio blobs, one per question (empty string for
    /// an unspoken answer)
    pub answers: Vec<String>,

    pub transcripts: Vec<String>,

    /// Omitted means "not evaluated" for every question
    pub feedback: Option<Vec<Option<Feedback>>>,
}

#[derive(Debug, Serialize)]
pub struct SaveSessionResponse {
    pub id: i64,
}

/// One row of the session history listing.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub timestamp: i64,
    pub total_questions: usize,
    pub average_score: f64,
    pub categories: CategoryAverages,
}

/// A full stored session, answers base64-encoded.
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    pub id: i64,
    pub timestamp: i64,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub transcripts: Vec<String>,
    pub feedback: Vec<Option<Feedback>>,
    pub average_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Inclusive lower bound, YYYY-MM-DD (local); absent or empty =
    /// unbounded
    pub from: Option<String>,

    /// Inclusive upper bound, YYYY-MM-DD (local); absent or empty =
    /// unbounded
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub stats: OverallStats,
    /// Sessions inside the range vs. stored overall
    pub filtered_sessions: usize,
    pub stored_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
    /// False when the built-in bank served instead of the generator
    pub generated: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Persist one completed practice run
pub async fn save_session(
    State(state): State<AppState>,
    Json(req): Json<SaveSessionRequest>,
) -> impl IntoResponse {
    let mut answers = Vec::with_capacity(req.answers.len());
    for (i, encoded) in req.answers.iter().enumerate() {
        match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => answers.push(bytes),
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Answer {} is not valid base64: {}", i + 1, e),
                );
            }
        }
    }

    match state
        .store
        .save(req.questions, answers, req.transcripts, req.feedback)
        .await
    {
        Ok(id) => {
            info!("Saved session {}", id);
            (StatusCode::OK, Json(SaveSessionResponse { id })).into_response()
        }
        Err(e @ StoreError::Misaligned { .. }) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e) => {
            error!("Failed to save session: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /sessions
/// Session history, most recent first
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_all().await {
        Ok(sessions) => {
            let summaries: Vec<SessionSummary> = sessions.iter().map(summarize).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(e) => {
            error!("Failed to list sessions: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /sessions/:id
/// One stored session in full, answers base64-encoded
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    // The store is bulk-read only; pick the record out client-side,
    // the same way the dashboard does.
    let sessions = match state.store.list_all().await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("Failed to read sessions: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    match sessions.into_iter().find(|s| s.id == id) {
        Some(session) => {
            let average_score = analytics::average_score(&session.feedback);
            let answers = session
                .answers
                .iter()
                .map(|blob| base64::engine::general_purpose::STANDARD.encode(blob))
                .collect();
            let detail = SessionDetail {
                id: session.id,
                timestamp: session.timestamp,
                questions: session.questions,
                answers,
                transcripts: session.transcripts,
                feedback: session.feedback,
                average_score,
            };
            (StatusCode::OK, Json(detail)).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, format!("Session {} not found", id)),
    }
}

/// GET /analytics?from=YYYY-MM-DD&to=YYYY-MM-DD
/// Aggregate statistics over the date-filtered history
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    let from = match parse_bound(query.from.as_deref()) {
        Ok(bound) => bound,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Bad 'from' date: {}", e)),
    };
    let to = match parse_bound(query.to.as_deref()) {
        Ok(bound) => bound,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Bad 'to' date: {}", e)),
    };

    let sessions = match state.store.list_all().await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("Failed to read sessions: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let filtered = analytics::filter_by_date_range(&sessions, from, to);
    let stats = analytics::overall_stats(&filtered);

    (
        StatusCode::OK,
        Json(AnalyticsResponse {
            stats,
            filtered_sessions: filtered.len(),
            stored_sessions: sessions.len(),
        }),
    )
        .into_response()
}

/// POST /questions
/// Generate interview questions from a topic and/or an uploaded resume
/// (multipart fields "topic" and "file"); falls back to the built-in
/// bank when the generator is unavailable
pub async fn generate_questions(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut topic: Option<String> = None;
    let mut resume_text: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Bad upload: {}", e));
            }
        };

        // Detach the metadata before consuming the field body
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("resume").to_string();

        match name.as_str() {
            "topic" => match field.text().await {
                Ok(text) if !text.trim().is_empty() => topic = Some(text),
                Ok(_) => {}
                Err(e) => {
                    return error_response(StatusCode::BAD_REQUEST, format!("Bad topic: {}", e));
                }
            },
            "file" => {
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Bad resume upload: {}", e),
                        );
                    }
                };
                if bytes.is_empty() {
                    continue;
                }
                match extract_text(&filename, &bytes) {
                    Ok(text) => resume_text = Some(text),
                    Err(e @ ExtractError::UnsupportedFileType { .. }) => {
                        return error_response(StatusCode::BAD_REQUEST, e.to_string());
                    }
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to parse resume file: {}", e),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    if topic.is_none() && resume_text.is_none() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Please provide a topic or upload a resume.",
        );
    }

    let source = QuestionSource { topic, resume_text };

    if let Some(generator) = &state.generator {
        match generator.generate(&source).await {
            Ok(questions) if !questions.is_empty() => {
                return (
                    StatusCode::OK,
                    Json(QuestionsResponse {
                        questions,
                        generated: true,
                    }),
                )
                    .into_response();
            }
            Ok(_) => warn!("Question generator returned an empty set, serving the bank"),
            Err(e) => warn!("Question generation failed, serving the bank: {}", e),
        }
    }

    (
        StatusCode::OK,
        Json(QuestionsResponse {
            questions: bank::fallback_questions(FALLBACK_QUESTION_COUNT),
            generated: false,
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// Helpers
// ============================================================================

fn summarize(session: &SessionRecord) -> SessionSummary {
    SessionSummary {
        id: session.id,
        timestamp: session.timestamp,
        total_questions: session.questions.len(),
        average_score: analytics::average_score(&session.feedback),
        categories: analytics::per_session_category_averages(session),
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Some),
    }
}
