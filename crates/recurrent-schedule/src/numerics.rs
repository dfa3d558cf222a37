//! `/`-separated numeric lists such as `3/1-2/7-8`.

use crate::error::{Result, ScheduleError};

/// Parse a list of integers and inclusive ranges into a sorted vector whose
/// values all lie within `[min, max]`.
///
/// Range endpoints are checked before the range is expanded. Duplicates are
/// kept; callers only ever take minimums over the result.
pub fn parse_numerics(to_parse: &str, min: i32, max: i32) -> Result<Vec<i32>> {
    let mut values = Vec::new();
    for token in to_parse.split('/').map(str::trim) {
        let malformed = || ScheduleError::MalformedNumericList {
            token: token.to_string(),
        };
        match token.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start.trim().parse().map_err(|_| malformed())?;
                let end: i32 = end.trim().parse().map_err(|_| malformed())?;
                if start > end {
                    return Err(malformed());
                }
                if start < min || end > max {
                    return Err(ScheduleError::DayOutOfRange {
                        list: vec![start, end],
                        min,
                        max,
                    });
                }
                values.extend(start..=end);
            }
            None => values.push(token.parse().map_err(|_| malformed())?),
        }
    }
    values.sort_unstable();
    check_bounds(values, min, max)
}

/// Ensure every value lies within `[min, max]`.
pub fn check_bounds(values: Vec<i32>, min: i32, max: i32) -> Result<Vec<i32>> {
    let in_bounds = match (values.first(), values.last()) {
        (Some(lo), Some(hi)) => *lo >= min && *hi <= max,
        _ => true,
    };
    if in_bounds {
        Ok(values)
    } else {
        Err(ScheduleError::DayOutOfRange {
            list: values,
            min,
            max,
        })
    }
}
