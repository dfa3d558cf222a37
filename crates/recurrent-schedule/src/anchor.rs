use chrono::{NaiveDateTime, NaiveTime, TimeZone};
use recurrent_core::{AnchorableRecord, DueDate};

use crate::error::{Result, ScheduleError};
use crate::types::{AnchorChoice, RecurrenceDescriptor};

/// Pick the timestamp a schedule counts forward from and express it as a
/// wall-clock time in `tz`.
///
/// Explicit `from ...` clauses win. Otherwise schedules naming specific days
/// count from the due date and all others from the completion time. Date-only
/// due dates are taken at midnight.
pub fn resolve_base<R, Tz>(
    record: &R,
    descriptor: &RecurrenceDescriptor,
    tz: &Tz,
) -> Result<NaiveDateTime>
where
    R: AnchorableRecord + ?Sized,
    Tz: TimeZone,
{
    if record.schedule().is_none() {
        return Err(ScheduleError::NoSchedule {
            name: record.name().to_string(),
        });
    }

    let anchor = descriptor.effective_anchor();
    match anchor {
        AnchorChoice::CompletedDate => {
            Ok(record.last_modified().with_timezone(tz).naive_local())
        }
        AnchorChoice::DueDate => match record.due_date() {
            Some(DueDate::Date(d)) => Ok(d.and_time(NaiveTime::MIN)),
            Some(DueDate::DateTime(dt)) => Ok(dt.with_timezone(tz).naive_local()),
            None => Err(ScheduleError::MissingAnchorField {
                name: record.name().to_string(),
                anchor,
            }),
        },
    }
}
