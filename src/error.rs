//! Error types for the apprec library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`ApprecError`] enum. The variants mirror the failure classes of the
//! recommendation engine: corrupt cluster datasets, empty inputs, unknown
//! strategies, untrained or inconsistent models and numeric breakdowns.
//!
//! # Examples
//!
//! ```
//! use apprec::error::{ApprecError, Result};
//!
//! fn sample(pool: &[String]) -> Result<&String> {
//!     pool.first()
//!         .ok_or_else(|| ApprecError::empty_input("nothing to sample from"))
//! }
//!
//! assert!(sample(&[]).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for apprec operations.
#[derive(Error, Debug)]
pub enum ApprecError {
    /// I/O errors (dataset files, persisted models, reports).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Cluster dataset failed its content-hash verification.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// An operation received nothing to work on.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A strategy identifier that maps to no strategy.
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// A model was used before training, or its internal state is inconsistent.
    #[error("Model state error: {0}")]
    ModelState(String),

    /// A computation produced NaN, infinity or a division by zero.
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// Malformed input data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error, displayed with its whole context chain
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ApprecError.
pub type Result<T> = std::result::Result<T, ApprecError>;

impl ApprecError {
    /// Create a new data integrity error.
    pub fn data_integrity<S: Into<String>>(msg: S) -> Self {
        ApprecError::DataIntegrity(msg.into())
    }

    /// Create a new empty input error.
    pub fn empty_input<S: Into<String>>(msg: S) -> Self {
        ApprecError::EmptyInput(msg.into())
    }

    /// Create a new unknown strategy error.
    pub fn unknown_strategy<S: Into<String>>(msg: S) -> Self {
        ApprecError::UnknownStrategy(msg.into())
    }

    /// Create a new model state error.
    pub fn model_state<S: Into<String>>(msg: S) -> Self {
        ApprecError::ModelState(msg.into())
    }

    /// Create a new numeric degeneracy error.
    pub fn numeric<S: Into<String>>(msg: S) -> Self {
        ApprecError::NumericDegeneracy(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        ApprecError::Parse(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ApprecError::InvalidConfig(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        ApprecError::SerializationError(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ApprecError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ApprecError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApprecError::Other(format!("Not found: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = ApprecError::data_integrity("clusters.txt digest mismatch");
        assert_eq!(
            error.to_string(),
            "Data integrity error: clusters.txt digest mismatch"
        );

        let error = ApprecError::empty_input("empty pool");
        assert_eq!(error.to_string(), "Empty input: empty pool");

        let error = ApprecError::model_state("not trained");
        assert_eq!(error.to_string(), "Model state error: not trained");

        let error = ApprecError::invalid_argument("rounds must be positive");
        assert_eq!(
            error.to_string(),
            "Error: Invalid argument: rounds must be positive"
        );
    }

    #[test]
    fn test_context_chain_is_displayed() {
        use anyhow::Context;

        let failed: Result<()> = Err(ApprecError::parse("line 3: bad weight"));
        let error: ApprecError = failed.context("loading term index idx.jsonl").unwrap_err().into();
        assert_eq!(
            error.to_string(),
            "loading term index idx.jsonl: Parse error: line 3: bad weight"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let apprec_error = ApprecError::from(io_error);

        match apprec_error {
            ApprecError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
