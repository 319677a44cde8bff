use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiagError>;

/// Failures of the tool itself. Problems found inside a request body are
/// reported as [`crate::IssueCode`]s, never as errors.
#[derive(Error, Debug)]
pub enum DiagError {
    #[error("log file not found: {}", .0.display())]
    LogNotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}
