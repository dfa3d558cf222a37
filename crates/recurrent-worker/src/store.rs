use chrono::{DateTime, SecondsFormat, Utc};
use recurrent_core::{DueDate, TaskRecord};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use crate::{
    db::init_db,
    error::{Result, WorkerError},
};

const TASK_COLUMNS: &str = "id, name, schedule, due_date, done, last_modified, parent_id";

/// Timestamps are stored in one fixed RFC 3339 shape so that string
/// comparison in SQL orders them correctly.
fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| WorkerError::InvalidStoredValue {
            column,
            value: value.to_string(),
        })
}

/// Raw column values of one `tasks` row, decoded outside the rusqlite closure
/// so that bad values surface as [`WorkerError::InvalidStoredValue`].
struct TaskRow {
    id: String,
    name: String,
    schedule: Option<String>,
    due_date: Option<String>,
    done: bool,
    last_modified: String,
    parent_id: Option<String>,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            schedule: row.get(2)?,
            due_date: row.get(3)?,
            done: row.get(4)?,
            last_modified: row.get(5)?,
            parent_id: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<TaskRecord> {
        let due_date = match self.due_date {
            Some(s) => Some(
                s.parse::<DueDate>()
                    .map_err(|_| WorkerError::InvalidStoredValue {
                        column: "due_date",
                        value: s.clone(),
                    })?,
            ),
            None => None,
        };
        Ok(TaskRecord {
            last_modified: parse_ts("last_modified", &self.last_modified)?,
            id: self.id,
            name: self.name,
            schedule: self.schedule.filter(|s| !s.trim().is_empty()),
            due_date,
            done: self.done,
            parent_id: self.parent_id,
        })
    }
}

/// SQLite-backed task list the worker reads completed tasks from and writes
/// recreated tasks to.
pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    /// Wrap `conn`, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a new open task.
    pub fn add_task(
        &self,
        name: &str,
        schedule: Option<&str>,
        due_date: Option<DueDate>,
        now: DateTime<Utc>,
    ) -> Result<TaskRecord> {
        let task = TaskRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            schedule: schedule.map(String::from),
            due_date,
            done: false,
            last_modified: now,
            parent_id: None,
        };
        self.insert(&task, now)?;
        info!(task_id = %task.id, %name, "task added");
        Ok(task)
    }

    /// Mark a task done at `at`. Returns `TaskNotFound` if no row is updated.
    pub fn complete_task(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE tasks SET done = 1, last_modified = ?2 WHERE id = ?1",
            rusqlite::params![id, ts(&at)],
        )?;
        if n == 0 {
            return Err(WorkerError::TaskNotFound { id: id.to_string() });
        }
        info!(task_id = %id, "task completed");
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<TaskRecord> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                TaskRow::from_row,
            )
            .optional()?;
        row.ok_or_else(|| WorkerError::TaskNotFound { id: id.to_string() })?
            .into_record()
    }

    /// All tasks ordered by creation time.
    pub fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, rowid"),
            rusqlite::params![],
        )
    }

    /// True when an uncompleted task with this name already exists.
    pub fn open_task_exists(&self, name: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE name = ?1 AND done = 0)",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Completed tasks with a schedule, modified at or after `since`
    /// (all of them when `since` is `None`).
    pub fn completed_recurring_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TaskRecord>> {
        let since = since.as_ref().map(ts);
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE done = 1 AND schedule IS NOT NULL AND TRIM(schedule) != ''
                   AND (?1 IS NULL OR last_modified >= ?1)
                 ORDER BY last_modified, rowid"
            ),
            [since],
        )
    }

    /// Recreate `previous` as a new open task due at `due`, linked back to it.
    pub fn insert_next(
        &self,
        previous: &TaskRecord,
        due: DueDate,
        now: DateTime<Utc>,
    ) -> Result<TaskRecord> {
        let task = TaskRecord {
            id: Uuid::new_v4().to_string(),
            name: previous.name.clone(),
            schedule: previous.schedule.clone(),
            due_date: Some(due),
            done: false,
            last_modified: now,
            parent_id: Some(previous.id.clone()),
        };
        self.insert(&task, now)?;
        Ok(task)
    }

    /// Time of the last fully successful worker pass.
    pub fn last_execution_time(&self) -> Result<Option<DateTime<Utc>>> {
        let last: Option<String> =
            self.conn
                .query_row("SELECT MAX(created_at) FROM executions", [], |row| row.get(0))?;
        last.map(|s| parse_ts("executions.created_at", &s)).transpose()
    }

    /// Record a successful pass at `at`, advancing the watermark.
    pub fn record_execution(&self, at: DateTime<Utc>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let name = format!("Execution ts: {}", at.to_rfc3339());
        self.conn.execute(
            "INSERT INTO executions (id, name, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, ts(&at)],
        )?;
        info!(execution_id = %id, "execution recorded");
        Ok(id)
    }

    // --- private helpers ---------------------------------------------------

    fn insert(&self, task: &TaskRecord, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks
             (id, name, schedule, due_date, done, last_modified, parent_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                task.id,
                task.name,
                task.schedule,
                task.due_date.map(|d| d.to_string()),
                task.done,
                ts(&task.last_modified),
                task.parent_id,
                ts(&now),
            ],
        )?;
        Ok(())
    }

    fn query_tasks<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<TaskRecord>> {
        // Collect eagerly so `stmt` is dropped before decoding.
        let rows: Vec<TaskRow> = {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, TaskRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(TaskRow::into_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn store() -> TaskStore {
        TaskStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn add_and_get_round_trip_keeps_due_kind() {
        let store = store();
        let due = DueDate::Date(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        let task = store
            .add_task("Laundry", Some("Every 1 weeks"), Some(due), utc(1, 9))
            .unwrap();
        let loaded = store.get_task(&task.id).unwrap();
        assert_eq!(loaded, task);
        assert!(!loaded.due_date.unwrap().has_time());
    }

    #[test]
    fn complete_unknown_task() {
        let store = store();
        let err = store.complete_task("nope", utc(1, 9)).unwrap_err();
        assert_eq!(err.code(), "TASK_NOT_FOUND");
    }

    #[test]
    fn completed_since_filters_by_done_schedule_and_time() {
        let store = store();
        let early = store.add_task("early", Some("Every day"), None, utc(1, 9)).unwrap();
        let late = store.add_task("late", Some("Every day"), None, utc(1, 9)).unwrap();
        let one_off = store.add_task("one-off", None, None, utc(1, 9)).unwrap();
        store.add_task("open", Some("Every day"), None, utc(1, 9)).unwrap();

        store.complete_task(&early.id, utc(2, 9)).unwrap();
        store.complete_task(&late.id, utc(4, 9)).unwrap();
        store.complete_task(&one_off.id, utc(4, 9)).unwrap();

        let all = store.completed_recurring_since(None).unwrap();
        assert_eq!(
            all.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["early", "late"]
        );

        let recent = store.completed_recurring_since(Some(utc(3, 0))).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, late.id);
    }

    #[test]
    fn open_task_detection() {
        let store = store();
        let task = store.add_task("Dishes", Some("Every day"), None, utc(1, 9)).unwrap();
        assert!(store.open_task_exists("Dishes").unwrap());
        store.complete_task(&task.id, utc(1, 10)).unwrap();
        assert!(!store.open_task_exists("Dishes").unwrap());
    }

    #[test]
    fn insert_next_links_parent() {
        let store = store();
        let task = store.add_task("Dishes", Some("Every day"), None, utc(1, 9)).unwrap();
        let due = DueDate::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        let next = store.insert_next(&task, due, utc(1, 10)).unwrap();
        assert_eq!(next.parent_id.as_deref(), Some(task.id.as_str()));
        assert_eq!(next.schedule, task.schedule);
        assert!(!next.done);
        assert_eq!(store.list_tasks().unwrap().len(), 2);
    }

    #[test]
    fn execution_watermark() {
        let store = store();
        assert_eq!(store.last_execution_time().unwrap(), None);
        store.record_execution(utc(1, 9)).unwrap();
        store.record_execution(utc(3, 9)).unwrap();
        assert_eq!(store.last_execution_time().unwrap(), Some(utc(3, 9)));
    }
}
