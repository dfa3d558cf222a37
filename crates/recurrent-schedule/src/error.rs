use thiserror::Error;

use crate::types::{AnchorChoice, Interval};

/// Errors raised while evaluating a single schedule. Every variant is fatal
/// to the evaluation in progress; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The record carries no schedule phrase at all.
    #[error("Task '{name}' has no schedule")]
    NoSchedule { name: String },

    /// First clause is not of the form `Every <int> <interval>`.
    #[error("Malformed frequency clause '{0}': expected 'Every <number> <interval>'")]
    MalformedFrequency(String),

    #[error("No known interval '{0}'")]
    UnknownInterval(String),

    #[error("No known anchor '{0}': expected 'due date' or 'completed date'")]
    UnknownAnchorKeyword(String),

    #[error("Malformed numeric list: bad token '{token}'")]
    MalformedNumericList { token: String },

    #[error("Out of bounds numbers in list {list:?}, min: {min}, max: {max}")]
    DayOutOfRange { list: Vec<i32>, min: i32, max: i32 },

    #[error("Schedules with an interval of {interval} cannot run on specific days ('{clause}')")]
    DaysNotAllowedForInterval { interval: Interval, clause: String },

    #[error("Schedule '{phrase}' names both specific days and an anchor date")]
    ConflictingConstraints { phrase: String },

    #[error("Cannot parse time of day '{0}'")]
    UnparseableTime(String),

    #[error("Unrecognized schedule clause '{0}'")]
    UnrecognizedClause(String),

    #[error("Task '{name}' has no value for its {anchor} anchor")]
    MissingAnchorField { name: String, anchor: AnchorChoice },

    /// Day constraints on yearly schedules are ambiguous (day of year versus
    /// day of an implied month) and are rejected until that is decided.
    #[error("Yearly schedules with specific days are not supported (days {0:?})")]
    UnsupportedYearDays(Vec<i32>),

    #[error("Date arithmetic out of range: {0}")]
    DateOutOfRange(String),

    #[error("Local time {0} does not exist in this timezone")]
    NonexistentLocalTime(String),

    #[error("Cron expression '{expression}' failed: {reason}")]
    Cron { expression: String, reason: String },
}

impl ScheduleError {
    /// Short error code string used in CLI and log output.
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::NoSchedule { .. } => "NO_SCHEDULE",
            ScheduleError::MalformedFrequency(_) => "MALFORMED_FREQUENCY",
            ScheduleError::UnknownInterval(_) => "UNKNOWN_INTERVAL",
            ScheduleError::UnknownAnchorKeyword(_) => "UNKNOWN_ANCHOR_KEYWORD",
            ScheduleError::MalformedNumericList { .. } => "MALFORMED_NUMERIC_LIST",
            ScheduleError::DayOutOfRange { .. } => "DAY_OUT_OF_RANGE",
            ScheduleError::DaysNotAllowedForInterval { .. } => "DAYS_NOT_ALLOWED_FOR_INTERVAL",
            ScheduleError::ConflictingConstraints { .. } => "CONFLICTING_CONSTRAINTS",
            ScheduleError::UnparseableTime(_) => "UNPARSEABLE_TIME",
            ScheduleError::UnrecognizedClause(_) => "UNRECOGNIZED_CLAUSE",
            ScheduleError::MissingAnchorField { .. } => "MISSING_ANCHOR_FIELD",
            ScheduleError::UnsupportedYearDays(_) => "UNSUPPORTED_YEAR_DAYS",
            ScheduleError::DateOutOfRange(_) => "DATE_OUT_OF_RANGE",
            ScheduleError::NonexistentLocalTime(_) => "NONEXISTENT_LOCAL_TIME",
            ScheduleError::Cron { .. } => "CRON_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
