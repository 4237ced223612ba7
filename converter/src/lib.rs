//! # mplusprep - survey export to Mplus conversion
//!
//! mplusprep turns a delimited survey export (one header line of variable
//! names, then numeric data lines) into a cleaned data file and a matching
//! Mplus input script.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Export file │────▶│   Parser    │────▶│  Transform  │────▶│ .dat + .inp │
//! │ (ISO/UTF8)  │     │ (validate)  │     │ (values)    │     │  (control)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mplusprep::{convert_text, CollectingSink, Config};
//!
//! let sink = CollectingSink::new();
//! let output = convert_text("ID\tAGE\n1\t23", "survey.dat", &Config::default(), &sink).unwrap();
//! assert_eq!(output.data, "1\t23");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Conversion options
//! - [`parser`] - Decoding, line splitting and classification
//! - [`transform`] - Value rewriting and the pipeline
//! - [`control`] - Input script generation
//! - [`storage`] - Input and output files
//! - [`logs`] - Diagnostics and progress logging

// Core modules
pub mod config;
pub mod error;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Script generation
pub mod control;

// Files
pub mod storage;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, PipelineError, PipelineResult, StorageError, StorageResult,
    ValidationError, ValidationResult,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::{Config, Replacement, CONFIG_ENV_VAR};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    classify_line, decode_content, detect_encoding, is_acceptable_cell, load_lines,
    validate_lines, ContextInfo, LineClass, LineValidator, RawLine, ValidatedInput, ValidatedRow,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    apply_replacements, check_file, convert_file, convert_lines, convert_text, render,
    Conversion, ConversionOutput, ConvertOptions, ConvertReport, ValueTransformer,
};

// =============================================================================
// Re-exports - Control script
// =============================================================================

pub use control::{duplicate_names, oversized_names, unlisted_names, wrap, wrap_segments, ControlFileGenerator};

// =============================================================================
// Re-exports - Storage and logging
// =============================================================================

pub use storage::{ensure_absent, ensure_distinct, read_input, write_outputs, DecodedInput, OutputPaths};

pub use logs::{CollectingSink, DiagnosticSink, LogBroadcaster, LogEntry, LogLevel};
