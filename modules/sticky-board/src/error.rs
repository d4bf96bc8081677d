use sticky_types::{NoteId, SnapshotError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    /// Rejected before any mutation: empty text, malformed import payload.
    #[error("{0}")]
    Validation(String),

    #[error("note {0} not found")]
    NotFound(NoteId),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("notes storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl NoteError {
    pub fn empty_text() -> Self {
        NoteError::Validation("Note text cannot be empty".to_string())
    }
}

impl From<SnapshotError> for NoteError {
    fn from(e: SnapshotError) -> Self {
        NoteError::Validation(format!("Invalid import file: {}", e))
    }
}

impl From<reqwest::Error> for NoteError {
    fn from(e: reqwest::Error) -> Self {
        NoteError::Transport(e.to_string())
    }
}
