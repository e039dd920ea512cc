use crate::http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationDirectoryError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Station directory is empty after skipping {skipped} malformed lines")]
    Empty { skipped: usize },

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Why a single directory line was skipped. Never escalated past a log entry.
#[derive(Debug, Error, PartialEq)]
pub enum StationLineError {
    #[error("expected at least 8 columns, found {0}")]
    TooFewColumns(usize),

    #[error("invalid {column} value '{value}'")]
    InvalidValue { column: &'static str, value: String },
}
