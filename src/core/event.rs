use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format used for the date keys of [`EventsByDate`].
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_START_TIME: &str = "09:00";
pub const DEFAULT_END_TIME: &str = "10:00";

/// Opaque event identifier. Events created here get a v4 UUID, but any
/// string read back from storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
}

impl Event {
    pub fn new(fields: EventFields) -> Self {
        Self::with_id(EventId::generate(), fields)
    }

    pub fn with_id(id: EventId, fields: EventFields) -> Self {
        Self {
            id,
            title: fields.title,
            start_time: fields.start_time,
            end_time: fields.end_time,
        }
    }

    pub fn fields(&self) -> EventFields {
        EventFields {
            title: self.title.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }

    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}

/// The editable part of an event: everything except its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
}

impl EventFields {
    pub fn new(
        title: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

impl Default for EventFields {
    fn default() -> Self {
        Self::new("", DEFAULT_START_TIME, DEFAULT_END_TIME)
    }
}

/// Events bucketed by calendar date, each bucket in insertion order.
///
/// A date never maps to an empty bucket; the key is dropped together with
/// its last event.
pub type EventsByDate = BTreeMap<NaiveDate, Vec<Event>>;

/// ISO "YYYY-MM-DD" form of a date, as used for storage keys.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Result of reading stored events record by record.
#[derive(Debug, Default)]
pub struct ParsedEvents {
    pub events: EventsByDate,
    /// Date keys, buckets, or records that could not be read and were skipped.
    pub discarded: usize,
}

/// Parse the stored mapping, keeping every record that reads cleanly.
///
/// Only a value that is not a JSON object at all is an error; a bad date key,
/// a bucket that is not an array, or a malformed record is counted in
/// [`ParsedEvents::discarded`] and skipped.
pub fn parse_events(json: &str) -> Result<ParsedEvents, serde_json::Error> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
    let mut parsed = ParsedEvents::default();

    for (key, bucket) in raw {
        let Some(date) = parse_date_key(&key) else {
            log::warn!("Skipping stored events under invalid date {:?}", key);
            parsed.discarded += 1;
            continue;
        };
        let serde_json::Value::Array(records) = bucket else {
            log::warn!("Skipping stored events for {}: not a list", key);
            parsed.discarded += 1;
            continue;
        };

        let mut events = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<Event>(record) {
                Ok(event) => events.push(event),
                Err(e) => {
                    log::warn!("Skipping stored event on {}: {}", key, e);
                    parsed.discarded += 1;
                }
            }
        }
        parsed.events.entry(date).or_default().extend(events);
    }

    Ok(parsed)
}

pub fn serialize_events(events: &EventsByDate) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stored_format_uses_camel_case_and_iso_keys() {
        let mut events = EventsByDate::new();
        events.insert(
            date(2024, 3, 5),
            vec![Event::with_id(
                EventId::from("abc"),
                EventFields::new("Standup", "09:00", "09:15"),
            )],
        );

        let json = serialize_events(&events).unwrap();
        assert_eq!(
            json,
            r#"{"2024-03-05":[{"id":"abc","title":"Standup","startTime":"09:00","endTime":"09:15"}]}"#
        );
    }

    #[test]
    fn parses_foreign_ids() {
        let json = r#"{"2024-12-31":[{"id":"1700000000000","title":"NYE","startTime":"20:00","endTime":"23:59"}]}"#;
        let parsed = parse_events(json).unwrap();
        assert_eq!(parsed.discarded, 0);
        let bucket = &parsed.events[&date(2024, 12, 31)];
        assert_eq!(bucket[0].id.as_str(), "1700000000000");
        assert_eq!(bucket[0].time_range(), "20:00 - 23:59");
    }

    #[test]
    fn rejects_values_that_are_not_a_mapping() {
        assert!(parse_events("[1, 2, 3]").is_err());
        assert!(parse_events("{not json").is_err());
    }

    #[test]
    fn skips_bad_keys_and_records_but_keeps_the_rest() {
        let json = r#"{
            "2024-01-01":[{"id":"a","title":"Keep me","startTime":"09:00","endTime":"10:00"}],
            "2024-01-02":[
                {"id":"b","title":"No end","startTime":"09:00"},
                {"id":"c","title":"Fine","startTime":"11:00","endTime":"12:00"}
            ],
            "not-a-date":[],
            "2024-01-03":"oops"
        }"#;
        let parsed = parse_events(json).unwrap();

        assert_eq!(parsed.discarded, 3);
        assert_eq!(parsed.events[&date(2024, 1, 1)][0].title, "Keep me");
        let second: Vec<_> = parsed.events[&date(2024, 1, 2)]
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(second, ["c"]);
        assert!(!parsed.events.contains_key(&date(2024, 1, 3)));
    }

    #[test]
    fn new_event_keeps_title_as_given_and_gets_fresh_id() {
        let a = Event::new(EventFields::new("  Lunch ", "12:00", "13:00"));
        let b = Event::new(EventFields::new("Lunch", "12:00", "13:00"));
        assert_eq!(a.title, "  Lunch ");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn date_key_roundtrip() {
        let d = date(2025, 1, 9);
        assert_eq!(date_key(d), "2025-01-09");
        assert_eq!(parse_date_key("2025-01-09"), Some(d));
        assert_eq!(parse_date_key("2025-13-01"), None);
    }

    #[test]
    fn default_fields_match_form_defaults() {
        let fields = EventFields::default();
        assert!(!fields.has_title());
        assert_eq!(fields.start_time, "09:00");
        assert_eq!(fields.end_time, "10:00");
    }
}
