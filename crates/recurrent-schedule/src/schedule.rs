use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::parser::LAST_DAY;
use crate::types::Interval;

/// Compute the next local wall-clock time a schedule is due, strictly after
/// the period `base` falls in.
///
/// Elapsed periods between `base` and `now` are rounded down to a multiple of
/// `frequency` and one more `frequency` is always added, so the result never
/// repeats `base` even when `now` sits exactly on a period boundary.
///
/// With `days`, candidates are resolved inside the target period (week or
/// month) and any candidate already behind `now` is pushed one `frequency`
/// further; the earliest candidate wins. Without `at_time` the result is at
/// midnight and `now` is compared at day granularity.
pub fn next_occurrence(
    base: NaiveDateTime,
    interval: Interval,
    frequency: u32,
    at_time: Option<NaiveTime>,
    days: Option<&[i32]>,
    now: NaiveDateTime,
) -> Result<NaiveDateTime> {
    let frequency = i64::from(frequency.max(1));
    let time = at_time.unwrap_or(NaiveTime::MIN);

    let elapsed = match interval {
        Interval::Days => (now - base).num_days(),
        Interval::Weeks => (week_start(now.date()) - week_start(base.date()))
            .num_days()
            .div_euclid(7),
        Interval::Months => {
            12 * i64::from(now.year() - base.year()) + i64::from(now.month())
                - i64::from(base.month())
        }
        Interval::Years => i64::from(now.year() - base.year()),
    };
    let periods = (elapsed.max(0) / frequency) * frequency + frequency;

    let days = match days {
        Some(days) if !days.is_empty() => days,
        _ => {
            let next = advance(base.date(), interval, periods)?;
            return Ok(next.and_time(time));
        }
    };

    let now = match at_time {
        Some(_) => now,
        None => now.date().and_time(NaiveTime::MIN),
    };

    let period_anchor = match interval {
        Interval::Weeks => advance(week_start(base.date()), Interval::Weeks, periods)?,
        Interval::Months => first_of_month(advance(base.date(), Interval::Months, periods)?),
        Interval::Years => return Err(ScheduleError::UnsupportedYearDays(days.to_vec())),
        Interval::Days => {
            return Err(ScheduleError::DaysNotAllowedForInterval {
                interval,
                clause: format!("{days:?}"),
            })
        }
    };

    let latest_due = {
        let latest = advance(base.date(), interval, periods)?;
        let offset = match days[0] {
            LAST_DAY => i64::from(last_day_of_month(latest)),
            d => i64::from(d - 1),
        };
        add_days(latest, offset)?
    };
    debug!(%base, %period_anchor, %latest_due, periods, "resolving day candidates");

    let mut next: Option<NaiveDateTime> = None;
    for &day in days {
        let mut candidate = resolve_day(period_anchor, interval, day)?.and_time(time);
        if candidate < now {
            let anchor = advance(period_anchor, interval, frequency)?;
            candidate = resolve_day(anchor, interval, day)?.and_time(time);
        }
        next = Some(next.map_or(candidate, |n| n.min(candidate)));
    }

    next.ok_or_else(|| ScheduleError::DateOutOfRange(format!("no candidate in {days:?}")))
}

/// Concrete date for `day` within the period starting at `anchor`.
fn resolve_day(anchor: NaiveDate, interval: Interval, day: i32) -> Result<NaiveDate> {
    if day == LAST_DAY {
        return with_day(anchor, last_day_of_month(anchor));
    }
    match interval {
        Interval::Months => {
            // Day 31 in a 30-day month falls on the 30th
            let day = u32::try_from(day)
                .map_err(|_| ScheduleError::DateOutOfRange(format!("day {day}")))?
                .min(last_day_of_month(anchor));
            with_day(anchor, day)
        }
        _ => add_days(anchor, i64::from(day - 1)),
    }
}

/// Move `date` forward by `count` units of `interval`. Month and year steps
/// clamp to the last day of a shorter target month.
fn advance(date: NaiveDate, interval: Interval, count: i64) -> Result<NaiveDate> {
    let out_of_range = || ScheduleError::DateOutOfRange(format!("{date} + {count} {interval}"));
    match interval {
        Interval::Days => add_days(date, count),
        Interval::Weeks => add_days(date, count.checked_mul(7).ok_or_else(out_of_range)?),
        Interval::Months | Interval::Years => {
            let months = if interval == Interval::Years {
                count.checked_mul(12).ok_or_else(out_of_range)?
            } else {
                count
            };
            let months = u32::try_from(months).map_err(|_| out_of_range())?;
            date.checked_add_months(Months::new(months))
                .ok_or_else(out_of_range)
        }
    }
}

fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(|| ScheduleError::DateOutOfRange(format!("{date} + {days} days")))
}

fn with_day(date: NaiveDate, day: u32) -> Result<NaiveDate> {
    date.with_day(day)
        .ok_or_else(|| ScheduleError::DateOutOfRange(format!("{date} with day {day}")))
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub(crate) fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}
