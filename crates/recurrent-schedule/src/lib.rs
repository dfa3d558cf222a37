//! `recurrent-schedule`: turns a recurrence phrase and a task's anchor
//! dates into the task's next due date.
//!
//! # Phrases
//!
//! | Phrase                                        | Meaning                               |
//! |-----------------------------------------------|---------------------------------------|
//! | `Every 3 days`                                | 3 days after completion               |
//! | `Every 2 weeks, from due date, at 9am`        | 2 weeks after the due date, 09:00     |
//! | `Every 1 weeks, on mon/thu`                   | next Monday or Thursday period        |
//! | `Every 1 months, on the last day`             | last day of each month                |
//! | `Every 3 months, on day 1/15`                 | 1st or 15th, every third month        |
//! | `Every day`, `Every weekday`, `Every friday`  | shorthands for the forms above        |
//! | `0 9 * * 1`                                   | standard cron, evaluated by `croner`  |
//!
//! Evaluation is a pure function of the phrase, the record snapshot and an
//! injected `now`; nothing is cached between calls.

pub mod anchor;
pub mod cron;
pub mod error;
pub mod evaluate;
pub mod normalize;
pub mod numerics;
pub mod parser;
pub mod schedule;
pub mod time;
pub mod types;

pub use error::{Result, ScheduleError};
pub use evaluate::{describe, next_due, next_due_now};
pub use types::{AnchorChoice, Interval, Occurrence, RecurrenceDescriptor};
