//! Local-only note store: the whole collection is one JSON array stored under
//! a single key of an injected [`SnapshotBacking`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use sticky_types::snapshot::{self, ImportSummary};
use sticky_types::{ImportMode, NewNote, Note, NoteId, NotePatch};

use super::{NoteStore, SnapshotBacking};
use crate::error::NoteError;

/// Key the browser build used for its localStorage entry.
pub const DEFAULT_STORAGE_KEY: &str = "stickyNotes";

pub struct LocalNoteStore {
    backing: Arc<dyn SnapshotBacking>,
    key: String,
    /// Held across every read-modify-write so a merge never lands on a stale
    /// copy of the blob.
    write_lock: Mutex<()>,
}

impl LocalNoteStore {
    pub fn new(backing: Arc<dyn SnapshotBacking>, key: impl Into<String>) -> Self {
        Self {
            backing,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_default_key(backing: Arc<dyn SnapshotBacking>) -> Self {
        Self::new(backing, DEFAULT_STORAGE_KEY)
    }

    fn load(&self) -> Result<Vec<Note>, NoteError> {
        let raw = self
            .backing
            .read(&self.key)
            .map_err(|e| NoteError::StorageUnavailable(format!("failed to read notes: {}", e)))?;

        match raw {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                log::warn!("[NOTES] Stored notes under '{}' are unreadable: {}", self.key, e);
                NoteError::StorageUnavailable(format!("stored notes are corrupt: {}", e))
            }),
        }
    }

    fn save(&self, notes: &[Note]) -> Result<(), NoteError> {
        let raw = serde_json::to_string(notes)
            .map_err(|e| NoteError::StorageUnavailable(format!("failed to encode notes: {}", e)))?;
        self.backing
            .write(&self.key, &raw)
            .map_err(|e| NoteError::StorageUnavailable(format!("failed to write notes: {}", e)))
    }

    /// Load, apply `f`, and persist the full collection if `f` succeeded.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<Note>) -> Result<T, NoteError>,
    ) -> Result<T, NoteError> {
        let _guard = self.write_lock.lock();
        let mut notes = self.load()?;
        let out = f(&mut notes)?;
        self.save(&notes)?;
        Ok(out)
    }
}

/// Millisecond timestamp ids, bumped past any existing integer id. When the
/// top of the range is already taken, the nearest free id below the clock is
/// used instead.
fn next_id(notes: &[Note], now: DateTime<Utc>) -> Result<NoteId, NoteError> {
    let taken: HashSet<i64> = notes.iter().filter_map(|n| n.id.as_int()).collect();
    let candidate = now.timestamp_millis();

    let bumped = match taken.iter().max() {
        Some(&h) if h >= candidate => h.checked_add(1),
        _ => Some(candidate),
    };
    if let Some(id) = bumped {
        return Ok(NoteId::Int(id));
    }

    (i64::MIN..=candidate)
        .rev()
        .find(|id| !taken.contains(id))
        .map(NoteId::Int)
        .ok_or_else(|| NoteError::StorageUnavailable("no free note id left".to_string()))
}

/// Never earlier than the newest existing note, so creation order survives
/// clock hiccups.
fn next_created_at(notes: &[Note], now: DateTime<Utc>) -> DateTime<Utc> {
    match notes.iter().map(|n| n.created_at).max() {
        Some(latest) if latest >= now => latest
            .checked_add_signed(Duration::milliseconds(1))
            .unwrap_or(latest),
        _ => now,
    }
}

#[async_trait]
impl NoteStore for LocalNoteStore {
    async fn list(&self) -> Result<Vec<Note>, NoteError> {
        self.load()
    }

    async fn create(&self, new_note: NewNote) -> Result<Note, NoteError> {
        let text = new_note.normalized_text().ok_or_else(NoteError::empty_text)?;

        let note = self.mutate(|notes| {
            let now = Utc::now();
            let note = Note {
                id: next_id(notes, now)?,
                text,
                created_at: next_created_at(notes, now),
                pinned: false,
                due_date: new_note.due_date,
                reminder_time: new_note.reminder_time,
            };
            notes.push(note.clone());
            Ok(note)
        })?;

        log::info!("[NOTES] Created note {}", note.id);
        Ok(note)
    }

    async fn update(&self, id: &NoteId, patch: NotePatch) -> Result<Note, NoteError> {
        patch.normalized_text().map_err(NoteError::Validation)?;

        self.mutate(|notes| {
            let note = notes
                .iter_mut()
                .find(|n| &n.id == id)
                .ok_or_else(|| NoteError::NotFound(id.clone()))?;
            patch.apply(note);
            Ok(note.clone())
        })
    }

    async fn delete(&self, id: &NoteId) -> Result<(), NoteError> {
        self.mutate(|notes| {
            let before = notes.len();
            notes.retain(|n| &n.id != id);
            if notes.len() == before {
                return Err(NoteError::NotFound(id.clone()));
            }
            Ok(())
        })?;

        log::info!("[NOTES] Deleted note {}", id);
        Ok(())
    }

    async fn import_all(&self, raw: &str, mode: ImportMode) -> Result<ImportSummary, NoteError> {
        let incoming = snapshot::parse_snapshot(raw)?;

        let summary = self.mutate(|notes| {
            let existing = std::mem::take(notes);
            let (combined, summary) = snapshot::combine(existing, incoming, mode);
            *notes = combined;
            Ok(summary)
        })?;

        log::info!(
            "[NOTES] Imported notes ({}): {} added, {} skipped, {} total",
            mode.as_str(),
            summary.added,
            summary.skipped,
            summary.total
        );
        Ok(summary)
    }
}
