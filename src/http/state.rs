use crate::collab::QuestionGenerator;
use crate::store::SessionStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session persistence (cheap to clone, shared connection)
    pub store: SessionStore,

    /// Question-generation collaborator; `None` when the collaborator
    /// bus is not reachable, in which case the built-in bank serves
    pub generator: Option<Arc<dyn QuestionGenerator>>,
}

impl AppState {
    pub fn new(store: SessionStore, generator: Option<Arc<dyn QuestionGenerator>>) -> Self {
        Self { store, generator }
    }
}
