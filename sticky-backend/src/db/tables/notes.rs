//! Notes table operations

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Result as SqliteResult, Row};
use sticky_types::serde_helpers::{format_date, format_time, parse_date, parse_time, parse_timestamp};
use sticky_types::{ImportMode, ImportSummary, Note, NoteId, NotePatch};

use super::super::Database;

const NOTE_COLUMNS: &str = "id, text, created_at, pinned, due_date, reminder_time";

/// Fixed-width RFC 3339 so that `MAX(created_at)` orders correctly as text.
fn timestamp_str(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(col: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, Type::Text, msg.into())
}

impl Database {
    fn row_to_note(row: &Row) -> SqliteResult<Note> {
        let created_at: String = row.get(2)?;
        let due_date: Option<String> = row.get(4)?;
        let reminder_time: Option<String> = row.get(5)?;

        Ok(Note {
            id: NoteId::Int(row.get(0)?),
            text: row.get(1)?,
            created_at: parse_timestamp(&created_at)
                .ok_or_else(|| conversion_error(2, format!("bad created_at: {}", created_at)))?,
            pinned: row.get::<_, i64>(3)? != 0,
            due_date: match due_date {
                Some(raw) => Some(
                    parse_date(&raw).ok_or_else(|| conversion_error(4, format!("bad due_date: {}", raw)))?,
                ),
                None => None,
            },
            reminder_time: match reminder_time {
                Some(raw) => Some(
                    parse_time(&raw)
                        .ok_or_else(|| conversion_error(5, format!("bad reminder_time: {}", raw)))?,
                ),
                None => None,
            },
        })
    }

    /// All notes, by id
    pub fn list_notes(&self) -> SqliteResult<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM notes ORDER BY id", NOTE_COLUMNS))?;
        let notes = stmt
            .query_map([], |row| Self::row_to_note(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(notes)
    }

    /// Insert a note. `text` must already be trimmed and non-empty.
    pub fn create_note(
        &self,
        text: &str,
        due_date: Option<chrono::NaiveDate>,
        reminder_time: Option<chrono::NaiveTime>,
    ) -> SqliteResult<Note> {
        let conn = self.conn.lock();

        // Keep creation order monotonic even if the clock steps backwards.
        let latest: Option<String> =
            conn.query_row("SELECT MAX(created_at) FROM notes", [], |row| row.get(0))?;
        let now = Utc::now();
        let created_at = match latest.as_deref().and_then(parse_timestamp) {
            Some(latest) if latest >= now => latest + Duration::microseconds(1),
            _ => now,
        };
        let created_at_str = timestamp_str(&created_at);

        conn.execute(
            "INSERT INTO notes (text, created_at, pinned, due_date, reminder_time)
             VALUES (?1, ?2, 0, ?3, ?4)",
            params![
                text,
                &created_at_str,
                due_date.as_ref().map(format_date),
                reminder_time.as_ref().map(format_time),
            ],
        )?;

        let id = conn.last_insert_rowid();
        log::info!("[NOTES] Created note {}", id);

        Ok(Note {
            id: NoteId::Int(id),
            text: text.to_string(),
            // Re-parse so the returned value matches what a later read yields.
            created_at: parse_timestamp(&created_at_str).unwrap_or(created_at),
            pinned: false,
            due_date,
            reminder_time,
        })
    }

    /// Apply a partial update in one statement and return the merged row.
    /// `Ok(None)` when no note has this id.
    pub fn update_note(&self, id: i64, patch: &NotePatch) -> SqliteResult<Option<Note>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE notes SET
                text = COALESCE(?2, text),
                pinned = COALESCE(?3, pinned),
                due_date = CASE WHEN ?4 THEN ?5 ELSE due_date END,
                reminder_time = CASE WHEN ?6 THEN ?7 ELSE reminder_time END
             WHERE id = ?1",
            params![
                id,
                patch.text.as_deref().map(str::trim),
                patch.pinned,
                patch.due_date.is_some(),
                patch.due_date.flatten().as_ref().map(format_date),
                patch.reminder_time.is_some(),
                patch.reminder_time.flatten().as_ref().map(format_time),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        let note = tx.query_row(
            &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
            [id],
            |row| Self::row_to_note(row),
        )?;
        tx.commit()?;

        Ok(Some(note))
    }

    /// `Ok(false)` when no note has this id.
    pub fn delete_note(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if deleted > 0 {
            log::info!("[NOTES] Deleted note {}", id);
        }
        Ok(deleted > 0)
    }

    /// Import already-validated notes with integer ids in one transaction.
    pub fn import_notes(&self, notes: &[(i64, &Note)], mode: ImportMode) -> SqliteResult<ImportSummary> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if mode == ImportMode::Replace {
            tx.execute("DELETE FROM notes", [])?;
        }

        let mut added = 0;
        let mut skipped = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO notes (id, text, created_at, pinned, due_date, reminder_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (id, note) in notes {
                let inserted = stmt.execute(params![
                    id,
                    note.text,
                    timestamp_str(&note.created_at),
                    note.pinned,
                    note.due_date.as_ref().map(format_date),
                    note.reminder_time.as_ref().map(format_time),
                ])?;
                if inserted > 0 {
                    added += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        let total: i64 = tx.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        tx.commit()?;

        log::info!(
            "[NOTES] Imported notes ({}): {} added, {} skipped",
            mode.as_str(),
            added,
            skipped
        );

        Ok(ImportSummary {
            added,
            skipped,
            total: total as usize,
        })
    }
}
