pub mod analytics;
pub mod collab;
pub mod config;
pub mod http;
pub mod session;
pub mod store;

pub use analytics::{
    average_score, filter_by_date_range, overall_stats, per_session_category_averages,
    CategoryAverages, OverallStats,
};
pub use collab::{
    NatsCollaborator, QuestionGenerator, QuestionSource, ScoreOutcome, Scorer, Transcriber,
    Transcription,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{Feedback, FeedbackTip, PracticeRun, SessionRecord};
pub use store::{SessionStore, StoreError};
