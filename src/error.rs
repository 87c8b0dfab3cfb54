//! Error handling module for provsheet
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Recoverable per-row issues never appear here; they are collected in the
//! extraction report. These types are reserved for document-level failures.

use thiserror::Error;

/// Main error type for provsheet
#[derive(Error, Debug)]
pub enum ProvsheetError {
    /// IO errors (reading the export, writing the document)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input errors (empty document, missing header block, zero valid rows)
    #[error("Input error: {0}")]
    Input(String),

    /// Validation errors (empty password, broken index symmetry, re-parse mismatch)
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for provsheet operations
pub type Result<T> = std::result::Result<T, ProvsheetError>;

// Convenient error constructors
impl ProvsheetError {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
