//! Lenient (de)serializers for note timestamps, due dates and reminder times.
//!
//! Notes arrive from two producers: the server (RFC 3339 timestamps, dates as
//! `YYYY-MM-DD`) and hand-edited or older local snapshots (epoch millis,
//! camelCase keys, empty strings for "no date"). Output is always canonical.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parse a calendar date. A full timestamp keeps its literal date part so a
/// date stored at UTC midnight never slides to the previous day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, TIME_FORMAT))
        .ok()
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) or a bare date
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub mod timestamp {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", ms))),
            Raw::Text(text) => parse_timestamp(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", text))),
        }
    }
}

pub mod optional_date {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&format_date(date)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {}", raw))),
        }
    }
}

pub mod optional_time {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => s.serialize_str(&format_time(time)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_time(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid time: {}", raw))),
        }
    }
}

/// Patch field: absent => `None` (via `#[serde(default)]`), `null` =>
/// `Some(None)`, value => `Some(Some(_))`.
pub mod patch_date {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<NaiveDate>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        super::optional_date::serialize(&value.flatten(), s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        super::optional_date::deserialize(d).map(Some)
    }
}

pub mod patch_time {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<NaiveTime>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        super::optional_time::serialize(&value.flatten(), s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<NaiveTime>>, D::Error> {
        super::optional_time::deserialize(d).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_keeps_literal_day() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10);
        assert_eq!(parse_date("2025-01-10"), expected);
        assert_eq!(parse_date("2025-01-10T00:00:00.000Z"), expected);
        assert_eq!(parse_date("2025-01-10T23:30:00-05:00"), expected);
        assert_eq!(parse_date("10/01/2025"), None);
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("07:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_time("07:05:30"), NaiveTime::from_hms_opt(7, 5, 30));
        assert_eq!(parse_time("7pm"), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = parse_timestamp("2025-01-02").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-01-02T00:00:00+00:00");

        let offset = parse_timestamp("2025-01-02T10:00:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2025-01-02T08:00:00+00:00");

        assert!(parse_timestamp("2025-01-02 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
