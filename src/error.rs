//! Error types for the mazebench crate

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Position;

/// Main error type for the mazebench crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid maze dimensions {rows}x{cols}: {reason}")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        reason: String,
    },

    #[error("position {position} is outside the {rows}x{cols} grid")]
    InvalidPosition {
        position: Position,
        rows: usize,
        cols: usize,
    },

    #[error("position {position} is a wall")]
    BlockedPosition { position: Position },

    #[error("grid row {row} has {got} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell value {value} at ({row}, {col}) (expected 0 = open or 1 = wall)")]
    InvalidCellValue { row: usize, col: usize, value: u8 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("{resource} lock poisoned by a panicked thread")]
    LockPoisoned { resource: String },

    #[error("value table not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported save format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
