//! Shared building blocks for the recurrent workspace: configuration,
//! the top-level error type, and the task record boundary consumed by the
//! schedule engine.

pub mod config;
pub mod error;
pub mod types;

pub use error::{RecurrentError, Result};
pub use types::{AnchorableRecord, DueDate, TaskRecord};
