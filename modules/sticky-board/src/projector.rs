//! View projector: ordering, filtering and display-state classification.
//!
//! Everything here is a pure function of its inputs. The order is recomputed
//! from the raw list on every render and never stored.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use sticky_types::Note;

/// Urgency tag used to style a note card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayState {
    Overdue,
    DueToday,
    DueTomorrow,
    Default,
}

impl DisplayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::Overdue => "overdue",
            DisplayState::DueToday => "due-today",
            DisplayState::DueTomorrow => "due-tomorrow",
            DisplayState::Default => "default",
        }
    }
}

/// Board ordering: pinned first; then dated before undated; dated ascending
/// by due date; remaining ties newest `created_at` first.
pub fn compare(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Filter by `search` (case-insensitive substring of the text) and order the
/// survivors with [`compare`]. The sort is stable, so notes with identical
/// keys keep their input order.
pub fn project<'a>(notes: &'a [Note], search: &str) -> Vec<&'a Note> {
    let needle = search.to_lowercase();
    let mut visible: Vec<&Note> = notes.iter().filter(|n| n.matches(&needle)).collect();
    visible.sort_by(|a, b| compare(a, b));
    visible
}

/// Classify against `now`, the viewer's local wall clock. Only the calendar
/// date of `now` is compared with `due_date`; the time part matters for the
/// reminder alone.
pub fn classify(note: &Note, now: NaiveDateTime) -> DisplayState {
    let Some(due) = note.due_date else {
        return DisplayState::Default;
    };
    let today = now.date();

    if due < today {
        return DisplayState::Overdue;
    }
    if due == today {
        return match note.reminder_time {
            Some(reminder) if reminder < now.time() => DisplayState::Overdue,
            _ => DisplayState::DueToday,
        };
    }
    if Some(due) == today.succ_opt() {
        return DisplayState::DueTomorrow;
    }
    DisplayState::Default
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use sticky_types::NoteId;

    fn ts(s: &str) -> DateTime<Utc> {
        sticky_types::serde_helpers::parse_timestamp(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn note(id: i64, text: &str, pinned: bool, due: Option<&str>, created: &str) -> Note {
        Note {
            id: NoteId::Int(id),
            text: text.to_string(),
            created_at: ts(created),
            pinned,
            due_date: due.map(date),
            reminder_time: None,
        }
    }

    fn ids(notes: &[&Note]) -> Vec<i64> {
        notes.iter().map(|n| n.id.as_int().unwrap()).collect()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn sample() -> Vec<Note> {
        vec![
            note(1, "Buy milk", false, Some("2025-01-10"), "2025-01-01"),
            note(2, "Call MOM", true, None, "2025-01-02"),
            note(3, "Write report", false, None, "2025-01-03"),
            note(4, "milk the goat", true, Some("2025-01-05"), "2025-01-04"),
            note(5, "Pay rent", false, Some("2025-01-03"), "2025-01-05"),
            note(6, "Groceries", false, None, "2025-01-06"),
        ]
    }

    #[test]
    fn test_scenario_pinned_then_dated_then_newest() {
        let notes = vec![
            note(1, "a", false, Some("2025-01-10"), "2025-01-01"),
            note(2, "b", true, None, "2025-01-02"),
            note(3, "c", false, None, "2025-01-03"),
        ];
        assert_eq!(ids(&project(&notes, "")), vec![2, 1, 3]);
    }

    #[test]
    fn test_full_ordering() {
        let notes = sample();
        assert_eq!(ids(&project(&notes, "")), vec![4, 2, 5, 1, 6, 3]);
    }

    #[test]
    fn test_empty_search_is_permutation() {
        let notes = sample();
        let mut projected = ids(&project(&notes, ""));
        projected.sort();
        assert_eq!(projected, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_exact() {
        let notes = sample();
        let projected = project(&notes, "MILK");
        assert_eq!(ids(&projected), vec![4, 1]);
        assert!(projected.iter().all(|n| n.text.to_lowercase().contains("milk")));

        assert_eq!(ids(&project(&notes, "mom")), vec![2]);
        assert!(project(&notes, "nothing matches").is_empty());
    }

    #[test]
    fn test_pinned_always_first() {
        let notes = sample();
        let projected = project(&notes, "");
        let first_unpinned = projected.iter().position(|n| !n.pinned).unwrap();
        assert!(projected[first_unpinned..].iter().all(|n| !n.pinned));
    }

    #[test]
    fn test_equal_dates_fall_back_to_newest_first() {
        let notes = vec![
            note(1, "older", false, Some("2025-02-01"), "2025-01-01"),
            note(2, "newer", false, Some("2025-02-01"), "2025-01-02"),
        ];
        assert_eq!(ids(&project(&notes, "")), vec![2, 1]);
    }

    #[test]
    fn test_identical_keys_keep_input_order() {
        let notes = vec![
            note(7, "same", false, None, "2025-01-01"),
            note(3, "same", false, None, "2025-01-01"),
        ];
        assert_eq!(ids(&project(&notes, "")), vec![7, 3]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let notes = sample();
        let once: Vec<Note> = project(&notes, "").into_iter().cloned().collect();
        let twice = project(&once, "");
        assert_eq!(ids(&twice), ids(&project(&notes, "")));
    }

    #[test]
    fn test_classify_by_date() {
        let now = at("2025-01-10 12:00");
        let due = |d: Option<&str>| note(1, "x", false, d, "2025-01-01");

        assert_eq!(classify(&due(Some("2025-01-09")), now), DisplayState::Overdue);
        assert_eq!(classify(&due(Some("2025-01-10")), now), DisplayState::DueToday);
        assert_eq!(classify(&due(Some("2025-01-11")), now), DisplayState::DueTomorrow);
        assert_eq!(classify(&due(Some("2025-01-12")), now), DisplayState::Default);
        assert_eq!(classify(&due(None), now), DisplayState::Default);
    }

    #[test]
    fn test_classify_reminder_today() {
        let mut n = note(1, "x", false, Some("2025-01-10"), "2025-01-01");

        n.reminder_time = NaiveTime::from_hms_opt(9, 0, 0);
        assert_eq!(classify(&n, at("2025-01-10 09:30")), DisplayState::Overdue);
        assert_eq!(classify(&n, at("2025-01-10 08:30")), DisplayState::DueToday);

        // A reminder only matters on the due day itself.
        assert_eq!(classify(&n, at("2025-01-09 23:00")), DisplayState::DueTomorrow);
    }

    #[test]
    fn test_classify_late_evening_does_not_shift_day() {
        let n = note(1, "x", false, Some("2025-01-10"), "2025-01-01");
        assert_eq!(classify(&n, at("2025-01-10 23:59")), DisplayState::DueToday);
        assert_eq!(classify(&n, at("2025-01-10 00:00")), DisplayState::DueToday);
    }

    #[test]
    fn test_classify_does_not_mutate() {
        let n = note(1, "x", true, Some("2020-01-01"), "2019-12-31");
        let before = n.clone();
        classify(&n, at("2025-01-10 12:00"));
        assert_eq!(n, before);
    }

    #[test]
    fn test_display_state_tags() {
        assert_eq!(DisplayState::DueTomorrow.as_str(), "due-tomorrow");
        assert_eq!(
            serde_json::to_value(DisplayState::DueToday).unwrap(),
            serde_json::json!("due-today")
        );
    }
}
