use rusqlite::Connection;

use crate::error::Result;

/// Initialise the worker schema in `conn`.
///
/// Creates the `tasks` and `executions` tables (idempotent). The index on
/// `(done, last_modified)` keeps the per-pass "completed since" query cheap.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id            TEXT    NOT NULL PRIMARY KEY,
            name          TEXT    NOT NULL,
            schedule      TEXT,               -- phrase or cron; NULL for one-off tasks
            due_date      TEXT,               -- YYYY-MM-DD or RFC 3339
            done          INTEGER NOT NULL DEFAULT 0,
            last_modified TEXT    NOT NULL,   -- RFC 3339 UTC
            parent_id     TEXT,               -- task this one was recreated from
            created_at    TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_tasks_done_modified ON tasks (done, last_modified);
        CREATE INDEX IF NOT EXISTS idx_tasks_name ON tasks (name);

        -- One row per fully successful worker pass; MAX(created_at) is the watermark.
        CREATE TABLE IF NOT EXISTS executions (
            id          TEXT NOT NULL PRIMARY KEY,
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
