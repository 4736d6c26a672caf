//! Error types for the funnel cleaning pipeline and API.
//!
//! - [`CsvError`] - CSV reading and decoding errors (see [`crate::parser`])
//! - [`CleanError`] - Per-table cleaning errors
//! - [`PipelineError`] - Batch orchestration errors, tagged with the file name
//! - [`ServerError`] - HTTP layer errors
//!
//! Conversion is automatic via `From` so `?` works across layers.

use thiserror::Error;

pub use crate::parser::CsvError;

// =============================================================================
// Cleaning Errors
// =============================================================================

/// Errors raised while cleaning one recognized table.
#[derive(Debug, Error)]
pub enum CleanError {
    /// A column the cleaner has to read or drop is not in the header.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A timestamp cell could not be parsed.
    #[error("Invalid date in column '{column}' at line {line}: '{value}'")]
    InvalidDate {
        column: String,
        line: usize,
        value: String,
    },

    /// No valid value exists to impute a categorical column from.
    #[error("Cannot compute the most frequent value of '{0}': no valid values")]
    EmptyMode(String),
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Batch-level errors. Any of these aborts the whole upload batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The file could not be read as CSV.
    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: CsvError,
    },

    /// The file was recognized but failed cleaning.
    #[error("{file}: {source}")]
    Clean {
        file: String,
        #[source]
        source: CleanError,
    },

    /// Reading an input path failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Name of the file the error belongs to, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            PipelineError::Csv { file, .. } | PipelineError::Clean { file, .. } => Some(file),
            PipelineError::Io(_) => None,
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unknown session id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Bad environment configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::Pipeline(PipelineError::Io(_)) => 500,
            ServerError::Pipeline(_) | ServerError::BadRequest(_) => 400,
            ServerError::SessionNotFound(_) => 404,
            ServerError::Config(_) | ServerError::Internal(_) => 500,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for cleaning operations.
pub type CleanResult<T> = Result<T, CleanError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
