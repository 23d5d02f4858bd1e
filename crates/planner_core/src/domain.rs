//! crates/planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the planner.
//! Records arrive already filtered to a single owner; nothing here performs I/O.
//!
//! Instants and calendar dates are two separate value types: a `Timestamp` is parsed
//! into an instant on demand, while a `CalendarDay` is only ever compared as an ISO
//! `YYYY-MM-DD` string.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

//=========================================================================================
// Value Types
//=========================================================================================

/// A point in time exactly as it was received from the store or the client.
///
/// Parsing is deferred to classification time so that one malformed record never
/// prevents the rest of a collection from being classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

/// Zone-less layouts, read in the consumer's local offset.
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the raw text into a UTC instant.
    ///
    /// Zone-less values are interpreted in `local`, the offset of the consumer's "now".
    /// A bare `YYYY-MM-DD` is UTC midnight of that date.
    /// Returns `None` for anything that is not a recognizable instant.
    pub fn parse(&self, local: &FixedOffset) -> Option<DateTime<Utc>> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(&Utc));
        }
        // Postgres renders timestamptz as `2025-03-12 10:00:00+00`.
        if let Ok(instant) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Some(instant.with_timezone(&Utc));
        }

        if let Some(naive) = NAIVE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        {
            return local
                .from_local_datetime(&naive)
                .single()
                .map(|instant| instant.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp
where
    Tz::Offset: std::fmt::Display,
{
    fn from(instant: DateTime<Tz>) -> Self {
        Self(instant.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::text(deserializer).map(Self)
    }
}

/// A date-only value (`YYYY-MM-DD`), never converted to an instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CalendarDay(String);

impl CalendarDay {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ISO date prefix used for comparisons, or `None` when the value is blank.
    ///
    /// ISO dates sort lexicographically in chronological order, so the key is compared
    /// as a plain string.
    pub fn key(&self) -> Option<&str> {
        let raw = self.0.trim();
        let key = raw.get(..10).unwrap_or(raw);
        (!key.is_empty()).then_some(key)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::text(deserializer).map(Self)
    }
}

//=========================================================================================
// Records
//=========================================================================================

/// The fixed set of event types. Unknown labels collapse into `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Assignment,
    Quiz,
    Exam,
    Timeblock,
    #[serde(other)]
    Other,
}

impl EventKind {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "assignment" => Self::Assignment,
            "quiz" => Self::Quiz,
            "exam" => Self::Exam,
            "timeblock" => Self::Timeblock,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Quiz => "quiz",
            Self::Exam => "exam",
            Self::Timeblock => "timeblock",
            Self::Other => "other",
        }
    }
}

/// A user-created, time-bounded item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    #[serde(default)]
    pub start_time: Timestamp,
    #[serde(default)]
    pub end_time: Timestamp,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completed: bool,
}

/// A recurring weekly class bounded by an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSchedule {
    pub id: Uuid,
    pub course_name: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub location: Option<String>,
    /// Weekday indices, 0 = Sunday. `None` when the stored value was not a list.
    #[serde(default, deserialize_with = "lenient::weekdays")]
    pub days_of_week: Option<Vec<i32>>,
    #[serde(default)]
    pub start_date: CalendarDay,
    #[serde(default)]
    pub end_date: CalendarDay,
    #[serde(default, deserialize_with = "lenient::text")]
    pub class_start_time: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub class_end_time: String,
}

// Represents a user - used for ownership and the dashboard greeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.full_name.trim() {
            "" => "Student",
            name => name,
        }
    }
}

//=========================================================================================
// Lenient Field Decoding
//=========================================================================================

mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrJunk {
        Text(String),
        Junk(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagOrJunk {
        Flag(bool),
        Junk(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DaysOrJunk {
        Days(Vec<i32>),
        Junk(IgnoredAny),
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match TextOrJunk::deserialize(deserializer)? {
            TextOrJunk::Text(text) => text,
            TextOrJunk::Junk(_) => String::new(),
        })
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let text = text(deserializer)?;
        Ok((!text.trim().is_empty()).then_some(text))
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(matches!(FlagOrJunk::deserialize(deserializer)?, FlagOrJunk::Flag(true)))
    }

    pub fn weekdays<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<i32>>, D::Error> {
        Ok(match DaysOrJunk::deserialize(deserializer)? {
            DaysOrJunk::Days(days) => Some(days),
            DaysOrJunk::Junk(_) => None,
        })
    }
}
