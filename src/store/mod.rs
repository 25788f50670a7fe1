//! Append-only persistence for completed practice sessions.
//!
//! The store is the sole owner of persisted records: callers hand it a
//! completed run and get back an id, consumers read snapshots via
//! `list_all`. The only query pattern is "all sessions, newest first,
//! filtered client-side", so there is a single table keyed by an
//! auto-increment id and no secondary indexes.

mod error;
mod sqlite;

pub use error::StoreError;
pub use sqlite::{SessionStore, DEFAULT_OPEN_TIMEOUT};
