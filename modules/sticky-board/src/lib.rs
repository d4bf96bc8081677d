//! Sticky notes board: note storage (local or server-backed), the view
//! projector that orders and classifies notes, and the UI workflow that ties
//! them together.

pub mod board;
pub mod config;
pub mod error;
pub mod projector;
pub mod store;

pub use board::{Board, DeleteConfirmation, NoteCard, SavedNotice};
pub use error::NoteError;
pub use projector::{DisplayState, classify, project};
pub use store::{LocalNoteStore, NoteStore, RemoteNoteStore};
pub use sticky_types as types;
