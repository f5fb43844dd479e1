//! Error types for indexpilot

use thiserror::Error;

/// The main error type for indexpilot operations
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // Parser / analyzer errors
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    // Workload ingestion errors
    #[error("Workload error: {0}")]
    Workload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Optimizer errors
    #[error("Optimizer error: {0}")]
    Optimizer(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Hypothetical index already exists: {0}")]
    HypoIndexExists(String),

    #[error("Hypothetical index not found: {0}")]
    HypoIndexNotFound(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using indexpilot's Error
pub type Result<T> = std::result::Result<T, Error>;
