//! Error types for the urlguard library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`UrlGuardError`] enum. The variants follow the failure taxonomy of the
//! training and inference pipeline: configuration problems, bad data,
//! artifact serialization, and load-time mismatches between the persisted
//! vectorizer and model.
//!
//! # Examples
//!
//! ```
//! use urlguard::error::{UrlGuardError, Result};
//!
//! fn check_columns(has_label: bool) -> Result<()> {
//!     if !has_label {
//!         return Err(UrlGuardError::config("dataset is missing the 'label' column"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_columns(false).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for urlguard operations.
#[derive(Error, Debug)]
pub enum UrlGuardError {
    /// I/O errors (file operations, network sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors (missing dataset columns, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data errors (empty dataset, null fields, wrong label classes)
    #[error("Data error: {0}")]
    Data(String),

    /// Artifact encoding, decoding or publishing errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Vectorizer and model do not belong together
    #[error("Mismatch error: {0}")]
    Mismatch(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Model state errors (using an unfitted model, etc.)
    #[error("Model error: {0}")]
    Model(String),

    /// Network probing errors
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with UrlGuardError.
pub type Result<T> = std::result::Result<T, UrlGuardError>;

impl UrlGuardError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Config(msg.into())
    }

    /// Create a new data error.
    pub fn data<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Data(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Serialization(msg.into())
    }

    /// Create a new mismatch error.
    pub fn mismatch<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Mismatch(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Analysis(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Model(msg.into())
    }

    /// Create a new network error.
    pub fn network<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Network(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        UrlGuardError::Other(format!("Invalid argument: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = UrlGuardError::config("missing column 'url'");
        assert_eq!(
            error.to_string(),
            "Configuration error: missing column 'url'"
        );

        let error = UrlGuardError::data("only one label class");
        assert_eq!(error.to_string(), "Data error: only one label class");

        let error = UrlGuardError::mismatch("dimension 3 != 4");
        assert_eq!(error.to_string(), "Mismatch error: dimension 3 != 4");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = UrlGuardError::from(io_error);

        match error {
            UrlGuardError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
