// End-to-end evaluation: phrase + record snapshot + injected clock.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use recurrent_core::{DueDate, TaskRecord};
use recurrent_schedule::{describe, next_due, AnchorChoice, Interval, Occurrence, ScheduleError};

fn est() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    est().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(schedule: &str, due: Option<DueDate>, modified: DateTime<FixedOffset>) -> TaskRecord {
    TaskRecord {
        id: "task-1".to_string(),
        name: "Take out recycling".to_string(),
        schedule: Some(schedule.to_string()),
        due_date: due,
        done: true,
        last_modified: modified.with_timezone(&Utc),
        parent_id: None,
    }
}

#[test]
fn daily_at_seven_counts_from_completion() {
    let completed = local(2024, 3, 6, 10, 20);
    let record = task("Every day, at 7am", None, completed);

    let descriptor = describe("Every day, at 7am").unwrap();
    assert_eq!(descriptor.interval, Interval::Days);
    assert_eq!(descriptor.frequency, 1);
    assert_eq!(descriptor.days, None);
    assert_eq!(descriptor.effective_anchor(), AnchorChoice::CompletedDate);

    let next = next_due(&record, &completed).unwrap();
    assert_eq!(next, Occurrence::DateTime(local(2024, 3, 7, 7, 0)));
}

#[test]
fn specific_weekdays_count_from_due_date() {
    let phrase = "Every 3 weeks, on mon-wed/friday";
    let descriptor = describe(phrase).unwrap();
    assert_eq!(descriptor.anchor_choice, None);
    assert_eq!(descriptor.days, Some(vec![1, 2, 3, 5]));
    assert_eq!(descriptor.effective_anchor(), AnchorChoice::DueDate);

    // Due Monday 2024-03-04; completed long after the due date must not matter.
    let record = task(
        phrase,
        Some(DueDate::Date(date(2024, 3, 4))),
        local(2024, 3, 5, 12, 0),
    );
    let next = next_due(&record, &local(2024, 3, 5, 12, 0)).unwrap();
    assert_eq!(next, Occurrence::Date(date(2024, 3, 25)));
}

#[test]
fn same_weekday_after_todays_time_rolls_to_next_week() {
    let record = task(
        "Every 1 weeks, on thu, at 8am",
        Some(DueDate::Date(date(2024, 3, 4))),
        local(2024, 3, 7, 10, 0),
    );
    let next = next_due(&record, &local(2024, 3, 7, 10, 0)).unwrap();
    assert_eq!(next, Occurrence::DateTime(local(2024, 3, 14, 8, 0)));
}

#[test]
fn shorthand_weekday_phrases() {
    let friday = local(2024, 3, 8, 18, 0);
    let record = task("every weekday", Some(DueDate::Date(date(2024, 3, 8))), friday);
    assert_eq!(
        next_due(&record, &friday).unwrap(),
        Occurrence::Date(date(2024, 3, 11))
    );

    let due = DueDate::DateTime(local(2024, 3, 8, 17, 0));
    let record = task("Every friday, at 5pm", Some(due), friday);
    assert_eq!(
        next_due(&record, &friday).unwrap(),
        Occurrence::DateTime(local(2024, 3, 15, 17, 0))
    );
}

#[test]
fn monthly_from_due_date_keeps_date_only() {
    let record = task(
        "Every 1 months, from due date",
        Some(DueDate::Date(date(2024, 1, 31))),
        local(2024, 1, 31, 9, 0),
    );
    let next = next_due(&record, &local(2024, 1, 31, 9, 0)).unwrap();
    assert_eq!(next, Occurrence::Date(date(2024, 2, 29)));
    assert_eq!(next.to_due_date(), DueDate::Date(date(2024, 2, 29)));
}

#[test]
fn cron_expressions_bypass_the_grammar() {
    // Wednesday 10:00 local
    let now = local(2024, 3, 6, 10, 0);
    let record = task("0 9 * * 1", None, now);
    assert_eq!(
        next_due(&record, &now).unwrap(),
        Occurrence::DateTime(local(2024, 3, 11, 9, 0))
    );
}

#[test]
fn conflicting_constraints() {
    let now = local(2024, 3, 6, 10, 0);
    let record = task(
        "Every 3 weeks, on mon-wed/friday, from due date",
        Some(DueDate::Date(date(2024, 3, 4))),
        now,
    );
    assert_eq!(
        next_due(&record, &now).unwrap_err().code(),
        "CONFLICTING_CONSTRAINTS"
    );
}

#[test]
fn days_not_allowed_for_daily() {
    let now = local(2024, 3, 6, 10, 0);
    let record = task("Every 3 days, on mon-wed/friday", None, now);
    assert_eq!(
        next_due(&record, &now).unwrap_err().code(),
        "DAYS_NOT_ALLOWED_FOR_INTERVAL"
    );
}

#[test]
fn missing_anchor_and_missing_schedule() {
    let now = local(2024, 3, 6, 10, 0);
    let record = task("Every 2 weeks, from due date", None, now);
    assert!(matches!(
        next_due(&record, &now).unwrap_err(),
        ScheduleError::MissingAnchorField {
            anchor: AnchorChoice::DueDate,
            ..
        }
    ));

    let mut record = task("Every 2 weeks", None, now);
    record.schedule = None;
    assert_eq!(
        next_due(&record, &now).unwrap_err(),
        ScheduleError::NoSchedule {
            name: "Take out recycling".to_string()
        }
    );
}

#[test]
fn yearly_day_constraints_are_unsupported() {
    let now = local(2024, 3, 6, 10, 0);
    let record = task(
        "Every 1 years, on day 45",
        Some(DueDate::Date(date(2024, 2, 14))),
        now,
    );
    assert_eq!(
        next_due(&record, &now).unwrap_err().code(),
        "UNSUPPORTED_YEAR_DAYS"
    );
}

/// Writing each result back as the new due date and completion time must
/// always move strictly forward.
#[test]
fn write_back_progression_is_monotonic() {
    let phrases = [
        "Every day",
        "Every 2 days, at 6:30am",
        "Every weekday, at 9am",
        "Every 2 weeks, on mon/thu",
        "Every 1 weeks, from due date",
        "Every 1 months, on the last day",
        "Every 3 months, on day 1/15, at noon",
        "Every 1 years",
    ];
    for phrase in phrases {
        let start = local(2024, 1, 31, 8, 0);
        let mut record = task(phrase, Some(DueDate::DateTime(start)), start);
        let mut previous = start;
        for _ in 0..24 {
            let next = next_due(&record, &previous).unwrap();
            let instant = match &next {
                Occurrence::DateTime(dt) => *dt,
                Occurrence::Date(d) => est()
                    .from_local_datetime(&d.and_hms_opt(0, 0, 0).unwrap())
                    .single()
                    .unwrap(),
            };
            assert!(instant > previous, "{phrase}: {instant} !> {previous}");
            record.due_date = Some(next.to_due_date());
            record.last_modified = instant.with_timezone(&Utc);
            previous = instant;
        }
    }
}
