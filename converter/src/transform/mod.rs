//! Transformation module.
//!
//! - Values: cell substitutions and missing-value handling
//! - Pipeline: validation, rewriting and script generation in one run

pub mod pipeline;
pub mod values;

pub use pipeline::*;
pub use values::{apply_replacements, ValueTransformer};
