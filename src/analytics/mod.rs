//! Pure aggregation over stored sessions.
//!
//! Everything in this module is side-effect free: records in, numbers
//! out. Missing data never raises an error here; unevaluated questions
//! and empty session sets aggregate to zero by policy.

mod aggregate;

pub use aggregate::{
    average_score, filter_by_date_range, overall_stats, per_session_category_averages,
    CategoryAverages, OverallStats,
};
