//! HTTP API for the practice UI
//!
//! This module provides the REST surface the pages talk to:
//! - POST /sessions - persist a completed practice run
//! - GET /sessions - session history, newest first
//! - GET /sessions/:id - one stored session in full
//! - GET /analytics?from=&to= - date-filtered aggregate statistics
//! - POST /questions - generate questions from a topic/resume
//! - GET /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
