//! Error types for Gaussian elimination.
//!
//! Input and dimension errors stop a solve before any elimination work is
//! done. A zero pivot is not an error: it is reported through
//! [`Solution::degenerate`](crate::Solution::degenerate).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, configuring or solving a linear system.
#[derive(Debug, Error)]
pub enum GaussError {
    /// The source file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The first line does not hold an integer equation count.
    #[error("cannot parse equation count from {line:?}")]
    InvalidHeight {
        /// The offending line
        line: String,
    },

    /// A token in the matrix body is not a real number.
    #[error("invalid number {token:?} at row {row}, column {column}")]
    InvalidToken {
        /// Zero-based row index
        row: usize,
        /// Zero-based column index
        column: usize,
        /// The offending token
        token: String,
    },

    /// The input ended before all declared rows were read.
    #[error("missing row {row}")]
    MissingRow {
        /// Zero-based row index
        row: usize,
    },

    /// A row holds fewer tokens than the declared width.
    #[error("row {row} has {got} values, expected {expected}")]
    ShortRow {
        /// Zero-based row index
        row: usize,
        /// Declared width
        expected: usize,
        /// Tokens found
        got: usize,
    },

    /// The matrix was flagged invalid when it was populated.
    #[error("input matrix is flagged invalid")]
    InvalidInput,

    /// The matrix is not an augmented square system.
    #[error("dimension mismatch: {height} equations need width {}, got {width}", .height + 1)]
    DimensionMismatch {
        /// Number of rows
        height: usize,
        /// Number of columns
        width: usize,
    },

    /// Chunk size must be positive.
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Worker count must be positive.
    #[error("invalid worker count: {0} (must be > 0)")]
    InvalidWorkerCount(usize),

    /// Unknown scheduling policy name or code.
    #[error("unknown schedule policy {0:?} (expected static, dynamic, guided or auto)")]
    UnknownSchedule(String),

    /// The worker pool could not be built.
    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The JSON configuration could not be parsed or written.
    #[error("configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// A specialized `Result` type for Gaussian elimination.
pub type Result<T> = std::result::Result<T, GaussError>;

impl GaussError {
    /// Returns `true` if the input could not be read or parsed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GaussError::Io { .. }
                | GaussError::InvalidHeight { .. }
                | GaussError::InvalidToken { .. }
                | GaussError::MissingRow { .. }
                | GaussError::ShortRow { .. }
                | GaussError::InvalidInput
        )
    }

    /// Returns `true` if the matrix is not `n x (n + 1)`.
    pub fn is_dimension_error(&self) -> bool {
        matches!(self, GaussError::DimensionMismatch { .. })
    }

    /// Returns `true` if a parallel configuration value was rejected.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            GaussError::InvalidChunkSize(_)
                | GaussError::InvalidWorkerCount(_)
                | GaussError::UnknownSchedule(_)
                | GaussError::Config(_)
        )
    }
}
