//! Error types for the mplusprep conversion pipeline.
//!
//! - [`ValidationError`] - structural and numeric failures found in the input
//! - [`ConfigError`] - configuration loading and sanity checks
//! - [`StorageError`] - input/output file handling
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ContextInfo;

// =============================================================================
// Validation Errors
// =============================================================================

/// Fatal problems found while classifying input lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A line splits into a different number of columns than the header.
    #[error("Line {line_number} has {found} columns, expected {expected} (as in line 1)")]
    ColumnCountMismatch {
        line_number: usize,
        found: usize,
        expected: usize,
    },

    /// A data line holds a value that is neither numeric nor blank.
    #[error("{}", .0.message())]
    NonNumericalData(ContextInfo),

    /// The input has no lines at all, so there is no header.
    #[error("Input is empty, expected a header line")]
    EmptyInput,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading or checking a [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Cannot read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from reading the input file or writing the outputs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputMissing(PathBuf),

    /// A destination file is already present.
    #[error("Output file already exists: {} (use --force to overwrite)", .0.display())]
    OutputAlreadyExists(PathBuf),

    /// An output path points at the input file.
    #[error("Output path is the input file: {}", .0.display())]
    OutputIsInput(PathBuf),

    /// The data file and the input script would be written to the same path.
    #[error("Data file and input script share the path {}", .0.display())]
    OutputsCollide(PathBuf),

    /// Any other IO failure.
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::convert_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
