//! `recurrent-worker`: recreates completed recurring tasks in a SQLite
//! task store.
//!
//! # Overview
//!
//! Tasks live in a SQLite `tasks` table. When a task with a schedule is
//! marked done, the next [`engine::RecurringWorker`] pass evaluates the
//! schedule with `recurrent-schedule` and inserts a fresh open task with the
//! next due date. Every fully successful pass is recorded in `executions`;
//! the latest row is the watermark the following pass starts from.

pub mod db;
pub mod engine;
pub mod error;
pub mod store;

pub use engine::{RecordOutcome, RecordReport, RecurringWorker, RunSummary};
pub use error::{Result, WorkerError};
pub use store::TaskStore;
