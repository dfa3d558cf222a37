//! Phrase grammar:
//!
//! ```text
//! Every <n> <days|weeks|months|years>
//!     [, from <due date|completed date>]
//!     [, on <day list>]
//!     [, at <time of day>]
//! ```
//!
//! Day lists are weekday names or numbers for weekly schedules
//! (`on mon-wed/friday`, `on day 1/3`), and `on day <list>` or
//! `on the last day` for monthly ones.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, ScheduleError};
use crate::normalize::{strip_prefix_ci, substitute_weekdays};
use crate::numerics::parse_numerics;
use crate::time::parse_time_of_day;
use crate::types::{AnchorChoice, Interval, RecurrenceDescriptor};

/// Sentinel day meaning "last day of the month".
pub const LAST_DAY: i32 = -1;

fn frequency_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^every\s+(\d+)\s+([a-z]+)$").expect("frequency pattern is valid")
    })
}

/// Parse a normalized phrase into a descriptor.
pub fn parse(phrase: &str) -> Result<RecurrenceDescriptor> {
    let mut clauses = phrase.split(',').map(str::trim);
    let first = clauses.next().unwrap_or_default();
    let (interval, frequency) = parse_frequency_and_interval(first)?;
    let mut descriptor = RecurrenceDescriptor::new(interval, frequency);

    for clause in clauses.filter(|c| !c.is_empty()) {
        if let Some(rest) = strip_prefix_ci(clause, "from ") {
            descriptor.anchor_choice = Some(parse_anchor_choice(rest)?);
        } else if strip_prefix_ci(clause, "on ").is_some() {
            let days = match interval {
                Interval::Days => {
                    return Err(ScheduleError::DaysNotAllowedForInterval {
                        interval,
                        clause: clause.to_string(),
                    })
                }
                Interval::Weeks => parse_weekdays(clause)?,
                Interval::Months | Interval::Years => parse_days(clause, interval)?,
            };
            descriptor.days = Some(days);
        } else if let Some(rest) = strip_prefix_ci(clause, "at ") {
            descriptor.at_time = Some(parse_time_of_day(rest)?);
        } else {
            return Err(ScheduleError::UnrecognizedClause(clause.to_string()));
        }
    }

    if descriptor.has_days() && descriptor.anchor_choice.is_some() {
        return Err(ScheduleError::ConflictingConstraints {
            phrase: phrase.to_string(),
        });
    }

    Ok(descriptor)
}

/// Parse `Every <n> <interval>`.
pub fn parse_frequency_and_interval(clause: &str) -> Result<(Interval, u32)> {
    let clause = clause.trim();
    let malformed = || ScheduleError::MalformedFrequency(clause.to_string());
    let caps = frequency_pattern().captures(clause).ok_or_else(malformed)?;
    let frequency: u32 = caps[1].parse().map_err(|_| malformed())?;
    if frequency == 0 {
        return Err(malformed());
    }
    let interval: Interval = caps[2].parse()?;
    Ok((interval, frequency))
}

/// Parse the text after `from`; spacing and case are ignored.
pub fn parse_anchor_choice(text: &str) -> Result<AnchorChoice> {
    let key: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase();
    match key.as_str() {
        "duedate" => Ok(AnchorChoice::DueDate),
        "completeddate" => Ok(AnchorChoice::CompletedDate),
        _ => Err(ScheduleError::UnknownAnchorKeyword(text.trim().to_string())),
    }
}

fn strip_on(clause: &str) -> &str {
    let clause = clause.trim();
    strip_prefix_ci(clause, "on ").unwrap_or(clause).trim()
}

/// Weekday list for weekly schedules: names, abbreviations or numbers,
/// optionally prefixed with `day`. Monday = 1 … Sunday = 7.
pub fn parse_weekdays(clause: &str) -> Result<Vec<i32>> {
    let body = strip_on(clause);
    let list = strip_prefix_ci(body, "day ").unwrap_or(body);
    Ok(dedup(parse_numerics(&substitute_weekdays(list), 1, 7)?))
}

/// Day list for monthly and yearly schedules: `day <list>` or
/// `the last day`.
pub fn parse_days(clause: &str, interval: Interval) -> Result<Vec<i32>> {
    let body = strip_on(clause);
    if body.eq_ignore_ascii_case("the last day") {
        return Ok(vec![LAST_DAY]);
    }
    let list = strip_prefix_ci(body, "day ")
        .ok_or_else(|| ScheduleError::UnrecognizedClause(clause.trim().to_string()))?;
    let max = match interval {
        Interval::Years => 366,
        _ => 31,
    };
    Ok(dedup(parse_numerics(list, 1, max)?))
}

fn dedup(mut values: Vec<i32>) -> Vec<i32> {
    values.dedup();
    values
}
