use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use recurrent_core::{DueDate, TaskRecord};
use recurrent_schedule::next_due;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    error::{Result, WorkerError},
    store::TaskStore,
};

/// What happened to one completed recurring task during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The next task was inserted.
    Created { task_id: String, due: DueDate },
    /// An open task with the same name already exists.
    SkippedOpen,
    Failed { code: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    /// ID of the completed task the outcome refers to.
    pub source_id: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

/// Result of one worker pass over the completed recurring tasks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<RecordReport>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Created { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::SkippedOpen))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Recreates completed recurring tasks with their next due date.
///
/// Each pass only looks at tasks completed since the last fully successful
/// pass. A pass in which any task fails is not recorded, so those tasks are
/// picked up again next time; tasks that did succeed are not duplicated
/// because their open successor is detected by name.
pub struct RecurringWorker {
    store: TaskStore,
}

impl RecurringWorker {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Run a single pass, evaluating schedules in `now`'s timezone.
    pub fn run_once<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<RunSummary> {
        let now_utc = now.with_timezone(&Utc);
        let since = self.store.last_execution_time()?;
        let tasks = self.store.completed_recurring_since(since)?;
        info!(count = tasks.len(), since = ?since, "recurring pass started");

        let mut summary = RunSummary::default();
        for task in &tasks {
            let outcome = match self.process(task, now, now_utc) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        task_id = %task.id,
                        name = %task.name,
                        code = e.code(),
                        "recurring task failed: {e}"
                    );
                    RecordOutcome::Failed {
                        code: e.code().to_string(),
                        error: e.to_string(),
                    }
                }
            };
            summary.reports.push(RecordReport {
                source_id: task.id.clone(),
                name: task.name.clone(),
                outcome,
            });
        }

        let failed = summary.failed();
        if failed > 0 {
            warn!(failed, total = summary.total(), "pass incomplete, watermark not advanced");
            return Err(WorkerError::BatchFailed {
                failed,
                total: summary.total(),
            });
        }

        self.store.record_execution(now_utc)?;
        info!(
            created = summary.created(),
            skipped = summary.skipped(),
            "recurring pass finished"
        );
        Ok(summary)
    }

    /// Main loop. Runs a pass every `poll_interval` until `shutdown` broadcasts `true`.
    pub async fn run(self, poll_interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = poll_interval.as_secs(), "recurring worker started");
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once(&Local::now()) {
                        error!(code = e.code(), "recurring pass error: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("recurring worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    fn process<Tz: TimeZone>(
        &self,
        task: &TaskRecord,
        now: &DateTime<Tz>,
        now_utc: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        if self.store.open_task_exists(&task.name)? {
            info!(task_id = %task.id, name = %task.name, "open task exists, skipping");
            return Ok(RecordOutcome::SkippedOpen);
        }
        let due = next_due(task, now)?.to_due_date();
        let next = self.store.insert_next(task, due, now_utc)?;
        info!(task_id = %next.id, parent_id = %task.id, %due, "next task created");
        Ok(RecordOutcome::Created {
            task_id: next.id,
            due,
        })
    }
}
