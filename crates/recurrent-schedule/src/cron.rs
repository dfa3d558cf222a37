//! Standard 5-field cron expressions bypass the phrase grammar entirely.

use chrono::{DateTime, TimeZone};
use croner::Cron;

use crate::error::{Result, ScheduleError};

/// True when `phrase` is a valid 5-field cron expression.
pub fn is_cron(phrase: &str) -> bool {
    phrase.split_whitespace().count() == 5 && Cron::new(phrase.trim()).parse().is_ok()
}

/// Next fire time strictly after `now`, in `now`'s timezone.
pub fn next_fire<Tz: TimeZone>(expression: &str, now: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    let cron_error = |reason: String| ScheduleError::Cron {
        expression: expression.to_string(),
        reason,
    };
    let cron = Cron::new(expression.trim())
        .parse()
        .map_err(|e| cron_error(e.to_string()))?;
    cron.find_next_occurrence(now, false)
        .map_err(|e| cron_error(e.to_string()))
}
