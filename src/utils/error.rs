use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Target application is still running (PID: {})", .pids.join(", "))]
    StillRunning { pids: Vec<String> },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// Short machine-readable kind, used in JSON output and exit codes.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Parse(_) => "parse_error",
            AppError::Io(_) => "io_error",
            AppError::StillRunning { .. } => "still_running",
            AppError::Cancelled(_) => "cancelled",
            AppError::CommandFailed(_) => "command_failed",
            AppError::Custom(_) => "error",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
