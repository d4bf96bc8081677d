//! Snapshot format for export/import: a pretty-printed JSON array of notes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::{ImportMode, Note, NoteId};

pub const EXPORT_FILE_PREFIX: &str = "sticky-notes";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot must be an array of notes")]
    NotAnArray,

    #[error("entry {index} is not an object")]
    NotAnObject { index: usize },

    #[error("entry {index} is missing the `{field}` field")]
    MissingField { index: usize, field: &'static str },

    #[error("entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("duplicate note id {0} in snapshot")]
    DuplicateId(NoteId),
}

/// Outcome of an import, returned by both stores and the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Snapshot notes written into the collection.
    pub added: usize,
    /// Snapshot notes ignored because their id already existed (merge only).
    pub skipped: usize,
    /// Collection size after the import.
    pub total: usize,
}

/// Parse raw snapshot text. Nothing is returned unless every entry is valid.
pub fn parse_snapshot(raw: &str) -> Result<Vec<Note>, SnapshotError> {
    let value: Value = serde_json::from_str(raw)?;
    validate_snapshot(value)
}

/// Validate an already-decoded snapshot: an array of objects that each carry
/// at least `id` and `text`.
pub fn validate_snapshot(value: Value) -> Result<Vec<Note>, SnapshotError> {
    let Value::Array(entries) = value else {
        return Err(SnapshotError::NotAnArray);
    };

    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let Some(object) = entry.as_object() else {
            return Err(SnapshotError::NotAnObject { index });
        };

        match object.get("id") {
            None | Some(Value::Null) => {
                return Err(SnapshotError::MissingField { index, field: "id" });
            }
            Some(Value::String(_)) => {}
            Some(Value::Number(n)) if n.is_i64() => {}
            Some(other) => {
                return Err(SnapshotError::InvalidEntry {
                    index,
                    reason: format!("id must be an integer or a string, got {}", other),
                });
            }
        }

        match object.get("text") {
            None | Some(Value::Null) => {
                return Err(SnapshotError::MissingField { index, field: "text" });
            }
            Some(Value::String(text)) if text.trim().is_empty() => {
                return Err(SnapshotError::InvalidEntry {
                    index,
                    reason: "text is empty".to_string(),
                });
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(SnapshotError::InvalidEntry {
                    index,
                    reason: "text must be a string".to_string(),
                });
            }
        }

        let mut note: Note = serde_json::from_value(entry).map_err(|e| {
            SnapshotError::InvalidEntry {
                index,
                reason: e.to_string(),
            }
        })?;
        note.text = note.text.trim().to_string();

        if !seen.insert(note.id.clone()) {
            return Err(SnapshotError::DuplicateId(note.id));
        }
        notes.push(note);
    }

    Ok(notes)
}

/// Pretty-printed JSON array, the export format.
pub fn render_snapshot(notes: &[Note]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(notes)?)
}

/// `sticky-notes-2025-01-10.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}-{}.json", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Combine `incoming` with `existing` per `mode`.
///
/// Merge never touches an existing note, even when the incoming note with the
/// same id has different content.
pub fn combine(existing: Vec<Note>, incoming: Vec<Note>, mode: ImportMode) -> (Vec<Note>, ImportSummary) {
    match mode {
        ImportMode::Replace => {
            let added = incoming.len();
            let summary = ImportSummary {
                added,
                skipped: 0,
                total: added,
            };
            (incoming, summary)
        }
        ImportMode::Merge => {
            let known: HashSet<NoteId> = existing.iter().map(|n| n.id.clone()).collect();
            let mut merged = existing;
            let mut added = 0;
            let mut skipped = 0;

            for note in incoming {
                if known.contains(&note.id) {
                    skipped += 1;
                } else {
                    merged.push(note);
                    added += 1;
                }
            }

            let total = merged.len();
            (merged, ImportSummary { added, skipped, total })
        }
    }
}
