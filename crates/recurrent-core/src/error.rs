use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecurrentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date value: {0}")]
    InvalidDate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecurrentError {
    /// Short error code string used in CLI and log output.
    pub fn code(&self) -> &'static str {
        match self {
            RecurrentError::Config(_) => "CONFIG_ERROR",
            RecurrentError::InvalidDate(_) => "INVALID_DATE",
            RecurrentError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RecurrentError>;
