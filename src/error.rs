//! # Error Types Module
//!
//! Custom error types shared by the whole crate.
//!
//! ## Categories:
//! - `Io` / `Csv` / `Image`: wrapped errors from std, `csv` and `image`
//! - `Fetch`: neither the local files nor the remote archive could be read
//! - `Schema`: an expected column is absent or a cell is malformed
//! - `MissingKey`: a reference entity is absent from a table or slice
//! - `ExternalProcess`: an invoked tool could not start or exited non-zero
//! - `MissingDependency`: an external tool is not installed
//! - `Render`: chart drawing failed
//! - `Validation`: invalid input or configuration
//!
//! Core functions return `Result<_, PopError>`; orchestration code wraps them
//! in `anyhow::Result` and callers can `downcast_ref::<PopError>()`.
//!
//! ## Example:
//! ```rust
//! use population_gif::PopError;
//!
//! let err = PopError::MissingKey("Atlantis".to_string());
//! assert_eq!(err.to_string(), "Missing key: Atlantis");
//! ```

/// Custom error types for loading, ranking and rendering population data
#[derive(thiserror::Error, Debug)]
pub enum PopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("{tool} failed: {message}")]
    ExternalProcess { tool: String, message: String },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Chart rendering error: {0}")]
    Render(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
