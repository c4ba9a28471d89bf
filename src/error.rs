use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by dataset loading and query parsing.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("failed to read dataset {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("unknown score band '{0}' (expected positive, neutral, negative or all)")]
    InvalidBand(String),

    #[error("score {0} is out of range (expected 1 to 5)")]
    InvalidScore(u8),
}

pub type Result<T, E = ReviewError> = std::result::Result<T, E>;
