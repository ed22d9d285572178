use std::path::PathBuf;
use thiserror::Error;

/// Reasons a raw dataset name is refused before anything touches the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Dataset name must not be empty")]
    Empty,
    #[error("Dataset name must contain only alphanumeric characters, underscores, and hyphens")]
    InvalidCharacters,
    #[error("Dataset name must be at most {max} characters (got {len})")]
    TooLong { len: usize, max: usize },
}

/// Failures while preparing the per-day dataset log.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create log directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to open log file {path}: {source}")]
    FileOpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write log header to {path}: {source}")]
    HeaderWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },
}

/// Terminal outcome of a rejected submission; each stage short-circuits the rest.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl SubmitError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}
