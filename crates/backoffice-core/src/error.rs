//! Error types for the data grid

use thiserror::Error;

/// Core error type for grid configuration and settings handling
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumnId(String),

    #[error("{feature} is enabled but no row id function was supplied")]
    MissingRowId { feature: &'static str },

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for grid operations
pub type Result<T> = std::result::Result<T, GridError>;
