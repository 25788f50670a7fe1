use chrono::{Local, LocalResult, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::session::{Feedback, SessionRecord};

/// Per-category score means for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverages {
    pub content: f64,
    pub structure: f64,
    pub clarity: f64,
    pub delivery: f64,
}

impl CategoryAverages {
    /// Mean of the four category means.
    pub fn overall(&self) -> f64 {
        (self.content + self.structure + self.clarity + self.delivery) / 4.0
    }
}

/// Cross-session aggregate over a set of stored sessions.
///
/// The `avg_*` fields are means of the per-session category averages
/// (a mean of means): every session contributes equally, however many
/// questions it contained. `total_questions` counts questions
/// regardless of whether feedback exists for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_sessions: usize,
    pub avg_content: f64,
    pub avg_structure: f64,
    pub avg_clarity: f64,
    pub avg_delivery: f64,
    pub avg_overall: f64,
    pub total_questions: usize,
}

/// Mean of all sub-scores across evaluated entries, rounded to one
/// decimal place.
///
/// A sequence with no evaluated entries scores exactly 0: an
/// unevaluated session reads as a zero on the dashboard, not as
/// missing data.
pub fn average_score(feedback: &[Option<Feedback>]) -> f64 {
    let evaluated: Vec<&Feedback> = feedback.iter().flatten().collect();
    if evaluated.is_empty() {
        return 0.0;
    }

    let total: f64 = evaluated.iter().map(|f| f.score_sum()).sum();
    let mean = total / (evaluated.len() as f64 * 4.0);
    (mean * 10.0).round() / 10.0
}

/// Mean of each sub-score across this session's evaluated entries,
/// all zero when nothing was evaluated.
pub fn per_session_category_averages(session: &SessionRecord) -> CategoryAverages {
    let evaluated: Vec<&Feedback> = session.feedback.iter().flatten().collect();
    if evaluated.is_empty() {
        return CategoryAverages::default();
    }

    let n = evaluated.len() as f64;
    CategoryAverages {
        content: evaluated.iter().map(|f| f.content).sum::<f64>() / n,
        structure: evaluated.iter().map(|f| f.structure).sum::<f64>() / n,
        clarity: evaluated.iter().map(|f| f.clarity).sum::<f64>() / n,
        delivery: evaluated.iter().map(|f| f.delivery).sum::<f64>() / n,
    }
}

/// Aggregate statistics across the given sessions; all zero for an
/// empty slice.
pub fn overall_stats(sessions: &[SessionRecord]) -> OverallStats {
    let total_questions = sessions.iter().map(|s| s.questions.len()).sum();
    if sessions.is_empty() {
        return OverallStats::default();
    }

    let per_session: Vec<CategoryAverages> =
        sessions.iter().map(per_session_category_averages).collect();
    let n = per_session.len() as f64;

    OverallStats {
        total_sessions: sessions.len(),
        avg_content: per_session.iter().map(|c| c.content).sum::<f64>() / n,
        avg_structure: per_session.iter().map(|c| c.structure).sum::<f64>() / n,
        avg_clarity: per_session.iter().map(|c| c.clarity).sum::<f64>() / n,
        avg_delivery: per_session.iter().map(|c| c.delivery).sum::<f64>() / n,
        avg_overall: per_session.iter().map(|c| c.overall()).sum::<f64>() / n,
        total_questions,
    }
}

/// Keep the sessions whose timestamp falls within the given calendar
/// range, preserving order. `from` is inclusive from local midnight,
/// `to` is inclusive through the entire local day (23:59:59.999). An
/// absent bound leaves that side unbounded.
pub fn filter_by_date_range(
    sessions: &[SessionRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<SessionRecord> {
    let from_ms = from.map(day_start_millis);
    let to_ms = to.map(day_end_millis);

    sessions
        .iter()
        .filter(|s| {
            from_ms.map_or(true, |lo| s.timestamp >= lo)
                && to_ms.map_or(true, |hi| s.timestamp <= hi)
        })
        .cloned()
        .collect()
}

/// Epoch milliseconds of local midnight on `date`.
fn day_start_millis(date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        // Midnight skipped by a DST jump: fall back to the UTC reading.
        LocalResult::None => midnight.and_utc().timestamp_millis(),
    }
}

/// Epoch milliseconds of the last instant of the local day on `date`,
/// i.e. one millisecond before the next midnight.
fn day_end_millis(date: NaiveDate) -> i64 {
    match date.succ_opt() {
        Some(next_day) => day_start_millis(next_day) - 1,
        None => i64::MAX,
    }
}
