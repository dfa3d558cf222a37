use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeZone};
use recurrent_core::DueDate;
use serde::{Serialize, Serializer};

use crate::error::ScheduleError;

/// The unit a schedule recurs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Days,
    Weeks,
    Months,
    Years,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Days => "days",
            Interval::Weeks => "weeks",
            Interval::Months => "months",
            Interval::Years => "years",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Interval {
    type Err = ScheduleError;

    /// Case-insensitive; singular and plural forms are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "days" => Ok(Interval::Days),
            "week" | "weeks" => Ok(Interval::Weeks),
            "month" | "months" => Ok(Interval::Months),
            "year" | "years" => Ok(Interval::Years),
            _ => Err(ScheduleError::UnknownInterval(s.to_string())),
        }
    }
}

/// Which record field the schedule counts forward from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorChoice {
    DueDate,
    /// Approximated by the record's last-modified time.
    CompletedDate,
}

impl fmt::Display for AnchorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorChoice::DueDate => write!(f, "due date"),
            AnchorChoice::CompletedDate => write!(f, "completed date"),
        }
    }
}

/// Parsed form of a recurrence phrase. Rebuilt from the phrase on every
/// evaluation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceDescriptor {
    pub interval: Interval,
    /// Number of intervals between occurrences; always at least 1.
    pub frequency: u32,
    /// Weekday numbers (Monday = 1) for weekly schedules, days of the month
    /// for monthly ones, where `-1` means the last day of the month.
    /// Sorted ascending, never empty when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_time: Option<NaiveTime>,
    /// Explicit anchor from a `from ...` clause. Never set together with `days`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_choice: Option<AnchorChoice>,
}

impl RecurrenceDescriptor {
    pub fn new(interval: Interval, frequency: u32) -> Self {
        Self {
            interval,
            frequency,
            days: None,
            at_time: None,
            anchor_choice: None,
        }
    }

    /// Anchor actually used: the explicit choice, else due date when specific
    /// days are named and completed date otherwise.
    pub fn effective_anchor(&self) -> AnchorChoice {
        match (self.anchor_choice, self.has_days()) {
            (Some(choice), _) => choice,
            (None, true) => AnchorChoice::DueDate,
            (None, false) => AnchorChoice::CompletedDate,
        }
    }

    pub fn has_days(&self) -> bool {
        self.days.as_ref().is_some_and(|d| !d.is_empty())
    }
}

/// The next time a schedule is due: a plain calendar date when the schedule
/// names no time of day, otherwise a local date-time.
#[derive(Debug, Clone)]
pub enum Occurrence<Tz: TimeZone> {
    Date(NaiveDate),
    DateTime(DateTime<Tz>),
}

impl<Tz: TimeZone> Occurrence<Tz> {
    pub fn date(&self) -> NaiveDate {
        match self {
            Occurrence::Date(d) => *d,
            Occurrence::DateTime(dt) => dt.date_naive(),
        }
    }

    /// Convert for write-back, keeping the date-vs-datetime distinction.
    pub fn to_due_date(&self) -> DueDate {
        match self {
            Occurrence::Date(d) => DueDate::Date(*d),
            Occurrence::DateTime(dt) => DueDate::DateTime(dt.with_timezone(&dt.offset().fix())),
        }
    }
}

impl<Tz: TimeZone> PartialEq for Occurrence<Tz> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Occurrence::Date(a), Occurrence::Date(b)) => a == b,
            (Occurrence::DateTime(a), Occurrence::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl<Tz: TimeZone> fmt::Display for Occurrence<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occurrence::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Occurrence::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl<Tz: TimeZone> Serialize for Occurrence<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
