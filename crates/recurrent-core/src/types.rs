use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RecurrentError;

/// A task's due date. Tasks without a time of day stay pure calendar dates;
/// the distinction is preserved through evaluation and write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl DueDate {
    /// Calendar date of the due date, in the offset it was recorded with.
    pub fn date(&self) -> NaiveDate {
        match self {
            DueDate::Date(d) => *d,
            DueDate::DateTime(dt) => dt.date_naive(),
        }
    }

    pub fn has_time(&self) -> bool {
        matches!(self, DueDate::DateTime(_))
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DueDate::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl FromStr for DueDate {
    type Err = RecurrentError;

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DueDate::Date(d));
        }
        DateTime::parse_from_rfc3339(s)
            .map(DueDate::DateTime)
            .map_err(|e| RecurrentError::InvalidDate(format!("'{s}': {e}")))
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The fields the schedule engine reads from a task. Implementors are plain
/// snapshots; the engine never mutates them.
pub trait AnchorableRecord {
    /// Used in diagnostics only.
    fn name(&self) -> &str;
    fn schedule(&self) -> Option<&str>;
    fn due_date(&self) -> Option<DueDate>;
    /// Stands in for the completion time of the task.
    fn last_modified(&self) -> DateTime<Utc>;
}

/// A task row as stored by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// UUID v4 string, primary key.
    pub id: String,
    pub name: String,
    /// Recurrence phrase or 5-field cron expression; `None` for one-off tasks.
    pub schedule: Option<String>,
    pub due_date: Option<DueDate>,
    pub done: bool,
    pub last_modified: DateTime<Utc>,
    /// The completed task this one was recreated from, if any.
    pub parent_id: Option<String>,
}

impl AnchorableRecord for TaskRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self) -> Option<&str> {
        self.schedule.as_deref()
    }

    fn due_date(&self) -> Option<DueDate> {
        self.due_date
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}
