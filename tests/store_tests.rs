// Integration tests for the SQLite session store.
//
// These tests verify the append-only contract: save assigns fresh ids
// and timestamps, list_all returns byte-for-byte round-trips newest
// first, and corrupt rows are repaired or rejected at read time.

use anyhow::Result;
use interview_practice::session::{Feedback, FeedbackTip};
use interview_practice::store::{SessionStore, StoreError};
use std::time::Duration;
use tempfile::TempDir;

fn feedback(content: f64, structure: f64, clarity: f64, delivery: f64) -> Feedback {
    Feedback {
        content,
        structure,
        clarity,
        delivery,
        tips: vec![],
    }
}

#[tokio::test]
async fn test_save_then_list_roundtrips_all_fields() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    let questions = vec![
        "Tell me about yourself.".to_string(),
        "Why this role?".to_string(),
    ];
    let answers = vec![vec![0x1au8, 0x2b, 0x3c, 0x00, 0xff], Vec::new()];
    let transcripts = vec!["I build storage engines.".to_string(), String::new()];
    let feedback_col = vec![
        Some(Feedback {
            content: 8.0,
            structure: 7.0,
            clarity: 8.0,
            delivery: 7.0,
            tips: vec![FeedbackTip {
                tip: "Open with a one-sentence summary.".to_string(),
                snippet: "I build storage engines.".to_string(),
            }],
        }),
        None,
    ];

    let id = store
        .save(
            questions.clone(),
            answers.clone(),
            transcripts.clone(),
            Some(feedback_col.clone()),
        )
        .await?;

    let sessions = store.list_all().await?;
    assert_eq!(sessions.len(), 1);

    let record = &sessions[0];
    assert_eq!(record.id, id);
    assert!(record.timestamp > 0, "timestamp should be stamped at save");
    assert_eq!(record.questions, questions);
    assert_eq!(record.answers, answers, "blobs must round-trip byte-for-byte");
    assert_eq!(record.transcripts, transcripts);
    assert_eq!(record.feedback, feedback_col);

    Ok(())
}

#[tokio::test]
async fn test_omitted_feedback_stores_all_none() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    store
        .save(
            vec!["Q1".to_string(), "Q2".to_string()],
            vec![vec![1], vec![2]],
            vec!["a".to_string(), "b".to_string()],
            None,
        )
        .await?;

    let sessions = store.list_all().await?;
    assert_eq!(sessions[0].feedback, vec![None, None]);

    Ok(())
}

#[tokio::test]
async fn test_list_all_orders_by_timestamp_descending() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    let mut ids = Vec::new();
    for i in 0..5 {
        let id = store
            .save(
                vec![format!("Question {}", i)],
                vec![vec![i as u8]],
                vec![format!("Answer {}", i)],
                None,
            )
            .await?;
        ids.push(id);
        // Distinct millisecond timestamps
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let sessions = store.list_all().await?;
    assert_eq!(sessions.len(), 5);

    for pair in sessions.windows(2) {
        assert!(
            pair[0].timestamp > pair[1].timestamp,
            "expected strictly descending timestamps, got {} then {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }

    let listed_ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed_ids, expected);

    Ok(())
}

#[tokio::test]
async fn test_same_millisecond_ties_break_by_id_descending() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    // Rapid-fire saves; some timestamps will collide within one
    // millisecond, where ordering must fall back to id.
    let mut ids = Vec::new();
    for i in 0..10 {
        let id = store
            .save(
                vec![format!("Q{}", i)],
                vec![Vec::new()],
                vec![String::new()],
                None,
            )
            .await?;
        ids.push(id);
    }

    let sessions = store.list_all().await?;
    let listed_ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed_ids, expected);

    Ok(())
}

#[tokio::test]
async fn test_ids_are_fresh_and_increasing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    let first = store
        .save(vec!["Q".to_string()], vec![vec![1]], vec!["t".to_string()], None)
        .await?;
    let second = store
        .save(vec!["Q".to_string()], vec![vec![2]], vec!["t".to_string()], None)
        .await?;

    assert!(second > first, "ids must be monotonically increasing");

    Ok(())
}

#[tokio::test]
async fn test_empty_store_lists_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    let sessions = store.list_all().await?;
    assert!(sessions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_misaligned_save_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    // Two questions, one answer
    let result = store
        .save(
            vec!["Q1".to_string(), "Q2".to_string()],
            vec![vec![1]],
            vec!["a".to_string(), "b".to_string()],
            None,
        )
        .await;

    assert!(matches!(result, Err(StoreError::Misaligned { .. })));

    // Nothing may have been persisted
    assert!(store.list_all().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_misaligned_feedback_save_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = SessionStore::open(temp_dir.path().join("sessions.db")).await?;

    let result = store
        .save(
            vec!["Q1".to_string(), "Q2".to_string()],
            vec![vec![1], vec![2]],
            vec!["a".to_string(), "b".to_string()],
            Some(vec![Some(feedback(5.0, 5.0, 5.0, 5.0))]),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Misaligned { .. })));

    Ok(())
}

#[tokio::test]
async fn test_records_survive_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("sessions.db");

    let id = {
        let store = SessionStore::open(&db_path).await?;
        store
            .save(
                vec!["Q".to_string()],
                vec![vec![9, 9, 9]],
                vec!["durable".to_string()],
                Some(vec![Some(feedback(6.0, 6.0, 6.0, 6.0))]),
            )
            .await?
    };

    let store = SessionStore::open(&db_path).await?;
    let sessions = store.list_all().await?;

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, id);
    assert_eq!(sessions[0].answers, vec![vec![9, 9, 9]]);

    Ok(())
}

#[tokio::test]
async fn test_short_feedback_row_is_repaired_at_read() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("sessions.db");

    let store = SessionStore::open(&db_path).await?;
    store
        .save(
            vec!["Q1".to_string(), "Q2".to_string()],
            vec![vec![1], vec![2]],
            vec!["a".to_string(), "b".to_string()],
            None,
        )
        .await?;

    // Corrupt the feedback column behind the store's back, simulating
    // a crash mid-evaluation from an older writer.
    {
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.execute(
            "UPDATE sessions SET feedback = ?1",
            rusqlite::params![r#"[{"content":5,"structure":5,"clarity":5,"delivery":5,"tips":[]}]"#],
        )?;
    }

    let sessions = store.list_all().await?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].feedback.len(), 2, "short feedback is padded");
    assert!(sessions[0].feedback[0].is_some());
    assert!(sessions[0].feedback[1].is_none());

    Ok(())
}

#[tokio::test]
async fn test_row_with_missing_answer_blobs_is_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("sessions.db");

    let store = SessionStore::open(&db_path).await?;
    let good = store
        .save(
            vec!["Q".to_string()],
            vec![vec![7]],
            vec!["kept".to_string()],
            None,
        )
        .await?;
    let corrupt = store
        .save(
            vec!["Q1".to_string(), "Q2".to_string()],
            vec![vec![1], vec![2]],
            vec!["a".to_string(), "b".to_string()],
            None,
        )
        .await?;

    {
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.execute(
            "DELETE FROM answers WHERE session_id = ?1 AND slot = 1",
            rusqlite::params![corrupt],
        )?;
    }

    let sessions = store.list_all().await?;
    assert_eq!(sessions.len(), 1, "unrepairable row must be skipped");
    assert_eq!(sessions[0].id, good);

    Ok(())
}

#[tokio::test]
async fn test_open_creates_parent_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("state").join("practice").join("sessions.db");

    let store = SessionStore::open(&nested).await?;
    store
        .save(vec!["Q".to_string()], vec![vec![1]], vec!["t".to_string()], None)
        .await?;

    assert!(nested.exists());

    Ok(())
}
