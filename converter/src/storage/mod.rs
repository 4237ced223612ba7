//! Input loading and output writing.
//!
//! Outputs default to `<stem>.dat` and `<stem>.inp` next to the input file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::parser::{decode_content, detect_encoding, load_lines, RawLine};

/// Extension of the generated data file
pub const DATA_EXTENSION: &str = "dat";

/// Extension of the generated input script
pub const CONTROL_EXTENSION: &str = "inp";

/// Decoded input lines plus the encoding they were read with.
#[derive(Debug, Clone)]
pub struct DecodedInput {
    pub encoding: String,
    pub lines: Vec<RawLine>,
}

/// Destination paths of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub data: PathBuf,
    pub control: PathBuf,
}

impl OutputPaths {
    /// Outputs next to `input`, named after its stem.
    pub fn for_input(input: &Path) -> Self {
        Self {
            data: input.with_extension(DATA_EXTENSION),
            control: input.with_extension(CONTROL_EXTENSION),
        }
    }

    /// Override either path.
    pub fn with_overrides(mut self, data: Option<PathBuf>, control: Option<PathBuf>) -> Self {
        if let Some(data) = data {
            self.data = data;
        }
        if let Some(control) = control {
            self.control = control;
        }
        self
    }

    /// File name the input script refers to.
    pub fn data_file_name(&self) -> String {
        self.data
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.data.to_string_lossy().into_owned())
    }
}

/// Read and decode the input file.
pub fn read_input(path: &Path) -> StorageResult<DecodedInput> {
    if !path.is_file() {
        return Err(StorageError::InputMissing(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);

    Ok(DecodedInput {
        encoding,
        lines: load_lines(&content),
    })
}

/// Fail if an output would replace the input or the two outputs coincide.
pub fn ensure_distinct(input: &Path, paths: &OutputPaths) -> StorageResult<()> {
    for path in [&paths.data, &paths.control] {
        if same_file(input, path) {
            return Err(StorageError::OutputIsInput(path.clone()));
        }
    }
    if same_file(&paths.data, &paths.control) {
        return Err(StorageError::OutputsCollide(paths.data.clone()));
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    // Only paths that exist can be resolved; a missing one cannot alias another.
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Fail if either output already exists.
pub fn ensure_absent(paths: &OutputPaths) -> StorageResult<()> {
    for path in [&paths.data, &paths.control] {
        if path.exists() {
            return Err(StorageError::OutputAlreadyExists(path.clone()));
        }
    }
    Ok(())
}

/// Write both outputs, creating parent directories as needed.
pub fn write_outputs(paths: &OutputPaths, data: &str, control: &str) -> StorageResult<()> {
    write_file(&paths.data, data)?;
    write_file(&paths.control, control)
}

fn write_file(path: &Path, content: &str) -> StorageResult<()> {
    let io_error = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, content).map_err(io_error)
}
