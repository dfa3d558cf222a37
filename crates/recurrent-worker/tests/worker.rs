// Worker passes over an in-memory store with an injected clock.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use recurrent_core::DueDate;
use recurrent_worker::{RecordOutcome, RecurringWorker, TaskStore, WorkerError};
use rusqlite::Connection;

fn est() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

fn local(d: u32, h: u32) -> DateTime<FixedOffset> {
    est().with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
}

fn utc(dt: DateTime<FixedOffset>) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

fn worker() -> RecurringWorker {
    RecurringWorker::new(TaskStore::new(Connection::open_in_memory().unwrap()).unwrap())
}

/// Add a task and mark it done at `completed`.
fn completed(
    worker: &RecurringWorker,
    name: &str,
    schedule: &str,
    due: Option<DueDate>,
    completed: DateTime<FixedOffset>,
) -> String {
    let store = worker.store();
    let task = store
        .add_task(name, Some(schedule), due, utc(local(1, 8)))
        .unwrap();
    store.complete_task(&task.id, utc(completed)).unwrap();
    task.id
}

fn open_due(worker: &RecurringWorker, name: &str) -> Option<DueDate> {
    worker
        .store()
        .list_tasks()
        .unwrap()
        .into_iter()
        .find(|t| t.name == name && !t.done)
        .and_then(|t| t.due_date)
}

#[test]
fn one_bad_schedule_blocks_watermark_but_not_other_tasks() {
    let worker = worker();
    completed(&worker, "Water plants", "Every 3 days", None, local(4, 9));
    completed(&worker, "Broken", "Every 2 fortnights", None, local(4, 9));

    let err = worker.run_once(&local(4, 12)).unwrap_err();
    assert!(matches!(err, WorkerError::BatchFailed { failed: 1, total: 2 }));
    assert_eq!(err.code(), "BATCH_FAILED");

    // The good task was still recreated.
    assert_eq!(
        open_due(&worker, "Water plants"),
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()))
    );
    // No watermark, so the next pass sees both tasks again.
    assert_eq!(worker.store().last_execution_time().unwrap(), None);

    let err = worker.run_once(&local(4, 13)).unwrap_err();
    assert!(matches!(err, WorkerError::BatchFailed { failed: 1, total: 2 }));
    let plants = worker
        .store()
        .list_tasks()
        .unwrap()
        .into_iter()
        .filter(|t| t.name == "Water plants")
        .count();
    assert_eq!(plants, 2, "retry must not duplicate the recreated task");
}

#[test]
fn failed_record_reports_schedule_error_code() {
    let worker = worker();
    completed(
        &worker,
        "Pay rent",
        "Every 1 months, from due date",
        None,
        local(4, 9),
    );
    // Missing due date surfaces as a per-record failure.
    assert!(worker.run_once(&local(4, 12)).is_err());
    assert_eq!(open_due(&worker, "Pay rent"), None);
}

#[test]
fn time_of_day_schedules_write_back_datetimes() {
    let worker = worker();
    completed(&worker, "Standup", "Every day, at 9:30am", None, local(4, 10));

    let summary = worker.run_once(&local(4, 11)).unwrap();
    assert_eq!(summary.created(), 1);

    let expected = est().with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
    assert_eq!(open_due(&worker, "Standup"), Some(DueDate::DateTime(expected)));
}

#[test]
fn weekday_schedule_follows_due_date() {
    let worker = worker();
    // Due Monday 2024-03-04, completed on Wednesday.
    completed(
        &worker,
        "Gym",
        "Every 1 weeks, on mon/thu",
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())),
        local(6, 18),
    );

    worker.run_once(&local(6, 19)).unwrap();
    assert_eq!(
        open_due(&worker, "Gym"),
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()))
    );
}

#[test]
fn watermark_limits_the_next_pass() {
    let worker = worker();
    let id = completed(&worker, "Dishes", "Every day", None, local(4, 9));

    let first = worker.run_once(&local(4, 10)).unwrap();
    assert_eq!(first.total(), 1);

    // Complete the recreated task after the watermark; only it is considered.
    let next_id = worker
        .store()
        .list_tasks()
        .unwrap()
        .into_iter()
        .find(|t| !t.done)
        .map(|t| t.id)
        .unwrap();
    worker
        .store()
        .complete_task(&next_id, utc(local(5, 9)))
        .unwrap();

    let second = worker.run_once(&local(5, 10)).unwrap();
    assert_eq!(second.total(), 1);
    assert_eq!(second.reports[0].source_id, next_id);
    assert_ne!(second.reports[0].source_id, id);
    match &second.reports[0].outcome {
        RecordOutcome::Created { due, .. } => {
            assert_eq!(*due, DueDate::Date(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}
