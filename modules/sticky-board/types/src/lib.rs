//! Shared types for the sticky notes backend and its clients.
//!
//! The `Note` model, the request bodies of the notes REST API, and the
//! snapshot format used by export/import all live here so the server and the
//! board agree on one wire shape.

pub mod serde_helpers;
pub mod snapshot;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use snapshot::{ImportSummary, SnapshotError};

// =====================================================
// Domain Types
// =====================================================

/// Opaque note identifier.
///
/// The server hands out integer row ids; older local snapshots may carry
/// string ids. Both serialize back in the shape they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Int(i64),
    Text(String),
}

impl NoteId {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            NoteId::Int(n) => Some(*n),
            NoteId::Text(_) => None,
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Int(n) => f.pad(&n.to_string()),
            NoteId::Text(s) => f.pad(s),
        }
    }
}

impl From<i64> for NoteId {
    fn from(n: i64) -> Self {
        NoteId::Int(n)
    }
}

impl FromStr for NoteId {
    type Err = std::convert::Infallible;

    /// Numeric strings become `Int` so that ids typed by a user match the
    /// ids the server assigned.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(n) => NoteId::Int(n),
            Err(_) => NoteId::Text(s.to_string()),
        })
    }
}

/// A single sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    #[serde(
        alias = "createdAt",
        default = "Utc::now",
        with = "serde_helpers::timestamp"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(alias = "dueDate", default, with = "serde_helpers::optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(alias = "reminderTime", default, with = "serde_helpers::optional_time")]
    pub reminder_time: Option<NaiveTime>,
}

impl Note {
    /// Case-insensitive substring match on the note text. An empty needle
    /// matches every note.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.text.to_lowercase().contains(&needle.to_lowercase())
    }
}

// =====================================================
// Request Types
// =====================================================

/// Body of `POST /api/notes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewNote {
    pub text: String,
    #[serde(
        alias = "dueDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::optional_date"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(
        alias = "reminderTime",
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::optional_time"
    )]
    pub reminder_time: Option<NaiveTime>,
}

impl NewNote {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Trimmed text, or `None` when there is nothing left to store.
    pub fn normalized_text(&self) -> Option<String> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Body of `PUT /api/notes/:id`. Absent fields are left untouched.
///
/// For `due_date` and `reminder_time` an explicit `null` clears the value,
/// hence the nested `Option`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(
        alias = "dueDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::patch_date"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(
        alias = "reminderTime",
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::patch_time"
    )]
    pub reminder_time: Option<Option<NaiveTime>>,
}

impl NotePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn pinned(pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.pinned.is_none()
            && self.due_date.is_none()
            && self.reminder_time.is_none()
    }

    /// Rejects a supplied text that trims to nothing. Returns the trimmed
    /// text when one was supplied.
    pub fn normalized_text(&self) -> Result<Option<String>, String> {
        match self.text.as_deref().map(str::trim) {
            Some("") => Err("Note text cannot be empty".to_string()),
            Some(t) => Ok(Some(t.to_string())),
            None => Ok(None),
        }
    }

    /// Merge the supplied fields into `note`. `id` and `created_at` are never
    /// touched. Callers validate text first.
    pub fn apply(&self, note: &mut Note) {
        if let Some(text) = &self.text {
            note.text = text.trim().to_string();
        }
        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }
        if let Some(due_date) = self.due_date {
            note.due_date = due_date;
        }
        if let Some(reminder_time) = self.reminder_time {
            note.reminder_time = reminder_time;
        }
    }
}

/// How an imported snapshot combines with the existing collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep everything, add only notes whose id is not present yet.
    #[default]
    Merge,
    /// Throw the existing collection away.
    Replace,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Merge => "merge",
            ImportMode::Replace => "replace",
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(ImportMode::Merge),
            "replace" => Ok(ImportMode::Replace),
            other => Err(format!("Unknown import mode: {}", other)),
        }
    }
}

// =====================================================
// Response Types
// =====================================================

/// JSON error body returned by every failing API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
