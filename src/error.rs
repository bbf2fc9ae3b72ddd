//! Error types for the ghostgrid crate

use thiserror::Error;

/// Main error type for the ghostgrid crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("board must have at least one row and one column")]
    EmptyBoard,

    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid category code {code} at ({row}, {col})")]
    InvalidCellCode { code: u8, row: usize, col: usize },

    #[error("invalid layout token '{token}' at ({row}, {col})")]
    InvalidLayoutToken {
        token: String,
        row: usize,
        col: usize,
    },

    #[error("layout has no agent cell")]
    MissingAgent,

    #[error("{entity} appears more than once in the layout")]
    DuplicateEntity { entity: String },

    #[error("{first} and {second} share cell ({row}, {col})")]
    OverlappingEntities {
        first: String,
        second: String,
        row: usize,
        col: usize,
    },

    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid action symbol '{symbol}' (expected one of U, D, L, R)")]
    InvalidAction { symbol: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
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
