//! Permissive time-of-day parsing for `at ...` clauses.

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::error::{Result, ScheduleError};

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)?$")
            .expect("time pattern is valid")
    })
}

/// Parse `9am`, `9:30 pm`, `14:30`, `14:30:15`, `noon` or `midnight` into a
/// time of day. Seconds are accepted but dropped.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime> {
    let trimmed = input.trim();
    let unparseable = || ScheduleError::UnparseableTime(trimmed.to_string());

    match trimmed.to_lowercase().as_str() {
        "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0).ok_or_else(unparseable),
        "midnight" => return Ok(NaiveTime::MIN),
        _ => {}
    }

    let caps = time_pattern().captures(trimmed).ok_or_else(unparseable)?;
    let mut hour: u32 = caps[1].parse().map_err(|_| unparseable())?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| unparseable())?,
        None => 0,
    };
    if let Some(s) = caps.get(3) {
        let second: u32 = s.as_str().parse().map_err(|_| unparseable())?;
        if second > 59 {
            return Err(unparseable());
        }
    }

    if let Some(meridiem) = caps.get(4) {
        if !(1..=12).contains(&hour) {
            return Err(unparseable());
        }
        let pm = meridiem.as_str().to_lowercase().starts_with('p');
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(unparseable)
}
