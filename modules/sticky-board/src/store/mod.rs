//! Note store: the authoritative list of notes.
//!
//! Two implementations sit behind one trait and are picked when the board is
//! composed: [`LocalNoteStore`] keeps the whole collection as one JSON blob
//! in an injected [`SnapshotBacking`], [`RemoteNoteStore`] talks to the notes
//! REST API.

pub mod backing;
pub mod local;
pub mod remote;

use async_trait::async_trait;
use sticky_types::snapshot::{self, ImportSummary};
use sticky_types::{ImportMode, NewNote, Note, NoteId, NotePatch};

use crate::error::NoteError;

pub use backing::{FileBacking, MemoryBacking, SnapshotBacking};
pub use local::LocalNoteStore;
pub use remote::RemoteNoteStore;

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, in no particular order.
    async fn list(&self) -> Result<Vec<Note>, NoteError>;

    /// Store-assigned id and creation time. Empty text is rejected.
    async fn create(&self, new_note: NewNote) -> Result<Note, NoteError>;

    /// Merge only the supplied fields into the note with `id`.
    async fn update(&self, id: &NoteId, patch: NotePatch) -> Result<Note, NoteError>;

    async fn delete(&self, id: &NoteId) -> Result<(), NoteError>;

    /// Pretty-printed JSON array of every note.
    async fn export_all(&self) -> Result<String, NoteError> {
        let notes = self.list().await?;
        Ok(snapshot::render_snapshot(&notes)?)
    }

    /// Validate `raw` and fold it into the collection. A malformed snapshot
    /// leaves the store untouched.
    async fn import_all(&self, raw: &str, mode: ImportMode) -> Result<ImportSummary, NoteError>;
}

#[cfg(test)]
pub(crate) mod tests {
    //! Behaviour every store must share, run against each implementation.

    use super::*;

    pub async fn exercise_update_keeps_other_fields(store: &dyn NoteStore) {
        let created = store
            .create(NewNote {
                text: "original".to_string(),
                due_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 10),
                reminder_time: None,
            })
            .await
            .unwrap();
        store.update(&created.id, NotePatch::pinned(true)).await.unwrap();

        store.update(&created.id, NotePatch::text("x")).await.unwrap();

        let notes = store.list().await.unwrap();
        let note = notes.iter().find(|n| n.id == created.id).unwrap();
        assert_eq!(note.text, "x");
        assert!(note.pinned);
        assert_eq!(note.due_date, created.due_date);
        assert_eq!(note.created_at, created.created_at);
    }

    pub async fn exercise_delete_twice(store: &dyn NoteStore) {
        let created = store.create(NewNote::text("gone soon")).await.unwrap();

        store.delete(&created.id).await.unwrap();

        let notes = store.list().await.unwrap();
        assert!(notes.iter().all(|n| n.id != created.id));
        assert!(matches!(
            store.delete(&created.id).await,
            Err(NoteError::NotFound(_))
        ));
    }

    pub async fn exercise_empty_create(store: &dyn NoteStore) {
        let before = store.list().await.unwrap().len();

        let result = store.create(NewNote::text("   ")).await;

        assert!(matches!(result, Err(NoteError::Validation(_))));
        assert_eq!(store.list().await.unwrap().len(), before);
    }

    pub async fn exercise_update_missing(store: &dyn NoteStore) {
        let result = store.update(&NoteId::Int(987_654), NotePatch::text("x")).await;
        assert!(matches!(result, Err(NoteError::NotFound(_))));
    }

    pub async fn exercise_import(store: &dyn NoteStore) {
        store.import_all(r#"[{"id": 5, "text": "old"}]"#, ImportMode::Replace).await.unwrap();

        let summary = store
            .import_all(r#"[{"id": 5, "text": "hi"}, {"id": 6, "text": "new"}]"#, ImportMode::Merge)
            .await
            .unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, 1);

        let notes = store.list().await.unwrap();
        let five = notes.iter().find(|n| n.id == NoteId::Int(5)).unwrap();
        assert_eq!(five.text, "old");

        let malformed = store.import_all(r#"[{"text": "no id"}]"#, ImportMode::Replace).await;
        assert!(matches!(malformed, Err(NoteError::Validation(_))));
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.import_all(r#"[{"id": 9, "text": "only"}]"#, ImportMode::Replace).await.unwrap();
        let notes = store.list().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, NoteId::Int(9));
    }
}
