use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection};
use tokio::task;
use tracing::{info, warn};

use super::error::StoreError;
use crate::session::{Feedback, SessionRecord};

/// How long `open` may spend before the store is reported unavailable.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   INTEGER NOT NULL,
    questions   TEXT NOT NULL,
    transcripts TEXT NOT NULL,
    feedback    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS answers (
    session_id INTEGER NOT NULL REFERENCES sessions(id),
    slot       INTEGER NOT NULL,
    audio      BLOB NOT NULL,
    PRIMARY KEY (session_id, slot)
);

CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);
"#;

/// SQLite-backed, append-only storage for completed practice sessions.
///
/// One row per session plus a child row per answer blob. Records are
/// written once at the end of a run and only ever read back afterwards;
/// there is no update or delete path. The handle is cheap to clone and
/// runs every database call on the blocking pool, one transaction per
/// call.
#[derive(Clone)]
pub struct SessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SessionStore {
    /// Open (creating on first use) the session database at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_timeout(path, DEFAULT_OPEN_TIMEOUT).await
    }

    /// Open with an explicit deadline. SQLite has no native open
    /// timeout, so a hung open (e.g. a stale lock on network storage)
    /// is converted into `Unavailable` here instead of blocking the
    /// caller indefinitely.
    pub async fn open_with_timeout(
        path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let opening = task::spawn_blocking(move || Self::open_blocking(&path));

        match tokio::time::timeout(timeout, opening).await {
            Ok(joined) => joined?,
            Err(_) => Err(StoreError::Unavailable(format!(
                "open did not complete within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    fn open_blocking(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let conn =
            Connection::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .and_then(|_| conn.pragma_update(None, "synchronous", "NORMAL"))
            .and_then(|_| conn.pragma_update(None, "foreign_keys", "ON"))
            .and_then(|_| conn.execute_batch(SCHEMA))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Session store ready: {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Persist one completed session in a single read-write
    /// transaction, stamping its timestamp at the moment of insertion.
    /// `feedback = None` stores "not evaluated" for every question.
    ///
    /// Returns the newly assigned session id.
    pub async fn save(
        &self,
        questions: Vec<String>,
        answers: Vec<Vec<u8>>,
        transcripts: Vec<String>,
        feedback: Option<Vec<Option<Feedback>>>,
    ) -> Result<i64, StoreError> {
        let feedback = feedback.unwrap_or_else(|| vec![None; questions.len()]);

        let n = questions.len();
        if answers.len() != n || transcripts.len() != n || feedback.len() != n {
            return Err(StoreError::Misaligned {
                questions: n,
                answers: answers.len(),
                transcripts: transcripts.len(),
                feedback: feedback.len(),
            });
        }

        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let questions_json = serde_json::to_string(&questions)?;
            let transcripts_json = serde_json::to_string(&transcripts)?;
            let feedback_json = serde_json::to_string(&feedback)?;

            let mut conn = lock(&conn)?;
            let tx = conn.transaction().map_err(StoreError::WriteFailed)?;

            let timestamp = Utc::now().timestamp_millis();
            tx.execute(
                "INSERT INTO sessions (timestamp, questions, transcripts, feedback)
                 VALUES (?1, ?2, ?3, ?4)",
                params![timestamp, questions_json, transcripts_json, feedback_json],
            )
            .map_err(StoreError::WriteFailed)?;
            let id = tx.last_insert_rowid();

            {
                let mut stmt = tx
                    .prepare("INSERT INTO answers (session_id, slot, audio) VALUES (?1, ?2, ?3)")
                    .map_err(StoreError::WriteFailed)?;
                for (slot, audio) in answers.iter().enumerate() {
                    stmt.execute(params![id, slot as i64, audio])
                        .map_err(StoreError::WriteFailed)?;
                }
            }

            tx.commit().map_err(StoreError::WriteFailed)?;
            Ok(id)
        })
        .await?
    }

    /// Read every stored session, most recent first (timestamp
    /// descending, ties broken by id descending). An empty store yields
    /// an empty vec.
    ///
    /// Rows that fail the slot-alignment contract are handled per the
    /// repair-or-reject policy: a drifted feedback column is repaired,
    /// anything else is skipped with a warning (see DESIGN.md).
    pub async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            let tx = conn.transaction().map_err(StoreError::ReadFailed)?;

            let rows: Vec<(i64, i64, String, String, String)> = {
                let mut stmt = tx
                    .prepare(
                        "SELECT id, timestamp, questions, transcripts, feedback
                         FROM sessions ORDER BY timestamp DESC, id DESC",
                    )
                    .map_err(StoreError::ReadFailed)?;
                let mapped = stmt
                    .query_map([], |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                        ))
                    })
                    .map_err(StoreError::ReadFailed)?;
                mapped
                    .collect::<Result<_, _>>()
                    .map_err(StoreError::ReadFailed)?
            };

            let mut records = Vec::with_capacity(rows.len());
            for (id, timestamp, questions_json, transcripts_json, feedback_json) in rows {
                let parsed = parse_columns(&questions_json, &transcripts_json, &feedback_json);
                let (questions, transcripts, feedback) = match parsed {
                    Ok(columns) => columns,
                    Err(e) => {
                        warn!("Skipping unreadable session record {}: {}", id, e);
                        continue;
                    }
                };

                let answers = {
                    let mut stmt = tx
                        .prepare(
                            "SELECT audio FROM answers WHERE session_id = ?1 ORDER BY slot ASC",
                        )
                        .map_err(StoreError::ReadFailed)?;
                    let mapped = stmt
                        .query_map(params![id], |row| row.get::<_, Vec<u8>>(0))
                        .map_err(StoreError::ReadFailed)?;
                    mapped
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(StoreError::ReadFailed)?
                };

                let mut record = SessionRecord {
                    id,
                    timestamp,
                    questions,
                    answers,
                    transcripts,
                    feedback,
                };
                record.repair_feedback();

                if !record.is_aligned() {
                    warn!(
                        "Skipping misaligned session record {}: {} questions, {} answers, {} transcripts",
                        record.id,
                        record.questions.len(),
                        record.answers.len(),
                        record.transcripts.len()
                    );
                    continue;
                }

                records.push(record);
            }

            tx.commit().map_err(StoreError::ReadFailed)?;
            Ok(records)
        })
        .await?
    }
}

type Columns = (Vec<String>, Vec<String>, Vec<Option<Feedback>>);

fn parse_columns(
    questions: &str,
    transcripts: &str,
    feedback: &str,
) -> Result<Columns, serde_json::Error> {
    Ok((
        serde_json::from_str(questions)?,
        serde_json::from_str(transcripts)?,
        serde_json::from_str(feedback)?,
    ))
}

fn lock(
    conn: &Arc<Mutex<Connection>>,
) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::Unavailable("connection mutex poisoned".to_string()))
}
