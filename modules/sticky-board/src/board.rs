//! Board: the UI-level workflow on top of a [`NoteStore`].
//!
//! Every action makes at most one store call, then reloads the full list.
//! Failures never propagate as panics: they are logged, queued as
//! user-visible alerts, and the action is reported as failed.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::time::{Duration, Instant};
use sticky_types::snapshot::{self, ImportSummary};
use sticky_types::{ImportMode, NewNote, Note, NoteId, NotePatch};

use crate::error::NoteError;
use crate::projector::{self, DisplayState};
use crate::store::NoteStore;

/// How long the "saved" indicator stays up after a successful write.
pub const SAVED_NOTICE_DURATION: Duration = Duration::from_secs(2);

/// Transient "saved" indicator. Purely presentational; holds no note state.
#[derive(Debug, Default, Clone, Copy)]
pub struct SavedNotice {
    shown_at: Option<Instant>,
}

impl SavedNotice {
    pub fn show(&mut self, now: Instant) {
        self.shown_at = Some(now);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|at| now.saturating_duration_since(at) < SAVED_NOTICE_DURATION)
    }
}

/// A pending delete. Obtained from [`Board::request_delete`] and consumed by
/// [`Board::confirm_delete`]; dropping it (or calling `cancel`) abandons the
/// request.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete only happens once the confirmation is confirmed"]
pub struct DeleteConfirmation {
    target: NoteId,
}

impl DeleteConfirmation {
    pub fn target(&self) -> &NoteId {
        &self.target
    }

    pub fn cancel(self) {
        log::debug!("[BOARD] Delete of note {} cancelled", self.target);
    }
}

/// One rendered card: the note and its urgency tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteCard<'a> {
    pub note: &'a Note,
    pub state: DisplayState,
}

pub struct Board<S: NoteStore> {
    store: S,
    notes: Vec<Note>,
    search: String,
    saved: SavedNotice,
    alerts: Vec<String>,
}

impl<S: NoteStore> Board<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            notes: Vec::new(),
            search: String::new(),
            saved: SavedNotice::default(),
            alerts: Vec::new(),
        }
    }

    /// The raw collection from the last refresh, unordered.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn saved_notice(&self) -> &SavedNotice {
        &self.saved
    }

    /// Drain pending user-visible error messages.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    fn alert(&mut self, action: &str, err: &NoteError) {
        log::warn!("[BOARD] {} failed: {}", action, err);
        self.alerts.push(format!("{} failed: {}", action, err));
    }

    /// Reload the whole collection. An unreadable store shows as empty.
    pub async fn refresh(&mut self) -> bool {
        match self.store.list().await {
            Ok(notes) => {
                self.notes = notes;
                true
            }
            Err(e) => {
                self.alert("Loading notes", &e);
                self.notes.clear();
                false
            }
        }
    }

    /// Ordered, filtered cards for the current search term.
    pub fn view(&self, now: NaiveDateTime) -> Vec<NoteCard<'_>> {
        projector::project(&self.notes, &self.search)
            .into_iter()
            .map(|note| NoteCard {
                note,
                state: projector::classify(note, now),
            })
            .collect()
    }

    /// [`view`](Self::view) against the local wall clock.
    pub fn view_now(&self) -> Vec<NoteCard<'_>> {
        self.view(Local::now().naive_local())
    }

    /// Shared tail of every mutation: saved notice on success, alert on
    /// failure, then a full reload either way.
    async fn finish<T>(&mut self, action: &str, result: Result<T, NoteError>) -> Result<T, NoteError> {
        match &result {
            Ok(_) => self.saved.show(Instant::now()),
            Err(e) => self.alert(action, e),
        }
        self.refresh().await;
        result
    }

    pub async fn add(&mut self, new_note: NewNote) -> Result<Note, NoteError> {
        // Blank input is a no-op: nothing reaches the store.
        if new_note.normalized_text().is_none() {
            let err = NoteError::empty_text();
            self.alert("Adding note", &err);
            return Err(err);
        }
        let result = self.store.create(new_note).await;
        self.finish("Adding note", result).await
    }

    /// An empty patch is rejected without touching the store.
    pub async fn edit(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note, NoteError> {
        if patch.is_empty() {
            let err = NoteError::Validation("Nothing to change".to_string());
            self.alert("Saving note", &err);
            return Err(err);
        }
        let result = self.store.update(id, patch).await;
        self.finish("Saving note", result).await
    }

    /// Flip `pinned` based on the last refreshed copy of the note.
    pub async fn toggle_pin(&mut self, id: &NoteId) -> Result<Note, NoteError> {
        let Some(current) = self.notes.iter().find(|n| &n.id == id).map(|n| n.pinned) else {
            let err = NoteError::NotFound(id.clone());
            self.alert("Pinning note", &err);
            return Err(err);
        };
        let result = self.store.update(id, NotePatch::pinned(!current)).await;
        self.finish("Pinning note", result).await
    }

    /// First half of deleting: hand out a confirmation for `id`.
    pub fn request_delete(&self, id: NoteId) -> DeleteConfirmation {
        log::debug!("[BOARD] Delete of note {} awaiting confirmation", id);
        DeleteConfirmation { target: id }
    }

    /// Second half of deleting. Consumes the confirmation whatever the outcome.
    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> Result<(), NoteError> {
        let result = self.store.delete(&confirmation.target).await;
        self.finish("Deleting note", result).await
    }

    /// File name and pretty JSON for a download of the whole collection.
    pub async fn export(&mut self, today: NaiveDate) -> Result<(String, String), NoteError> {
        match self.store.export_all().await {
            Ok(body) => Ok((snapshot::export_file_name(today), body)),
            Err(e) => {
                self.alert("Exporting notes", &e);
                Err(e)
            }
        }
    }

    pub async fn import(&mut self, raw: &str, mode: ImportMode) -> Result<ImportSummary, NoteError> {
        let result = self.store.import_all(raw, mode).await;
        self.finish("Importing notes", result).await
    }
}
