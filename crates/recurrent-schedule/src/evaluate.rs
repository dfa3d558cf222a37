use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use recurrent_core::AnchorableRecord;
use tracing::debug;

use crate::anchor::resolve_base;
use crate::cron;
use crate::error::{Result, ScheduleError};
use crate::normalize::normalize;
use crate::parser::parse;
use crate::schedule::next_occurrence;
use crate::types::{Occurrence, RecurrenceDescriptor};

/// Parse a phrase (shorthands included) into its descriptor.
pub fn describe(phrase: &str) -> Result<RecurrenceDescriptor> {
    parse(&normalize(phrase))
}

/// Next time `record` is due after `now`, evaluated in `now`'s timezone.
///
/// Cron expressions are handed to the cron evaluator; everything else goes
/// through the phrase grammar. The result is a plain date unless the phrase
/// names a time of day.
pub fn next_due<R, Tz>(record: &R, now: &DateTime<Tz>) -> Result<Occurrence<Tz>>
where
    R: AnchorableRecord + ?Sized,
    Tz: TimeZone,
{
    let phrase = record.schedule().ok_or_else(|| ScheduleError::NoSchedule {
        name: record.name().to_string(),
    })?;

    if cron::is_cron(phrase) {
        debug!(task = record.name(), %phrase, "delegating to cron evaluator");
        return cron::next_fire(phrase, now).map(Occurrence::DateTime);
    }

    let descriptor = describe(phrase)?;
    let tz = now.timezone();
    let base = resolve_base(record, &descriptor, &tz)?;
    debug!(task = record.name(), ?descriptor, %base, "evaluating schedule");

    let next = next_occurrence(
        base,
        descriptor.interval,
        descriptor.frequency,
        descriptor.at_time,
        descriptor.days.as_deref(),
        now.naive_local(),
    )?;

    match descriptor.at_time {
        Some(_) => localize(&tz, next).map(Occurrence::DateTime),
        None => Ok(Occurrence::Date(next.date())),
    }
}

/// [`next_due`] against the system clock.
pub fn next_due_now<R>(record: &R) -> Result<Occurrence<Local>>
where
    R: AnchorableRecord + ?Sized,
{
    next_due(record, &Local::now())
}

/// Attach `tz` to a wall-clock time. Times inside a DST gap move forward by
/// the usual one hour; ambiguous times take the earlier instant.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .ok_or_else(|| ScheduleError::NonexistentLocalTime(naive.to_string()))
}
