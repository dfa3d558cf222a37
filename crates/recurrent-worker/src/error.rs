use recurrent_core::RecurrentError;
use recurrent_schedule::ScheduleError;
use thiserror::Error;

/// Errors that can occur within the recurring-task worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The task's schedule could not be evaluated.
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Core(#[from] RecurrentError),

    /// No task with the given ID exists in the store.
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// A stored column could not be decoded.
    #[error("Invalid stored value in {column}: {value}")]
    InvalidStoredValue { column: &'static str, value: String },

    /// At least one record in the pass failed; the run was not recorded.
    #[error("{failed} of {total} recurring tasks failed")]
    BatchFailed { failed: usize, total: usize },
}

impl WorkerError {
    /// Short error code string used in CLI and log output.
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::Database(_) => "DATABASE_ERROR",
            WorkerError::Schedule(e) => e.code(),
            WorkerError::Core(e) => e.code(),
            WorkerError::TaskNotFound { .. } => "TASK_NOT_FOUND",
            WorkerError::InvalidStoredValue { .. } => "INVALID_STORED_VALUE",
            WorkerError::BatchFailed { .. } => "BATCH_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
