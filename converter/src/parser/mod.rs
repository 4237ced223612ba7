//! Input decoding, line splitting and line classification.
//!
//! Line 1 always holds the variable names. Every later line must split into
//! the same number of columns, and each of its cells must be numeric or
//! blank unless the config says to accept non-numerical lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::error::{ValidationError, ValidationResult};
use crate::logs::DiagnosticSink;

/// UTF-8 byte order mark, dropped from decoded input.
const BOM: char = '\u{feff}';

/// Number of header lines preceding the data block.
const HEADER_LINES: usize = 1;

/// Optional sign, digits, optional `,`/`.` fraction, optional exponent.
static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[0-9]+(?:[.,][0-9]+)?(?:(?:e[+-]?)?[0-9]+)?$").expect("numeric pattern is valid")
});

/// One line of the input, as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 0-based position in the file
    pub index: usize,
    /// 1-based line number
    pub line_number: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            line_number: index + 1,
            text: text.into(),
        }
    }

    pub fn is_header(&self) -> bool {
        self.index < HEADER_LINES
    }

    /// Split on the configured splitter character.
    pub fn columns(&self, splitter: char) -> Vec<&str> {
        self.text.split(splitter).collect()
    }
}

/// Where and why a data line failed the numeric test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo {
    pub first_offending_value: String,
    /// 1-based
    pub column_index: usize,
    /// 1-based
    pub line_number: usize,
    /// 1-based row within the data block
    pub row_number: usize,
    pub raw_line_text: String,
}

impl ContextInfo {
    pub fn message(&self) -> String {
        format!(
            "Non-numerical data in line {} (data row {}), column {}: '{}'",
            self.line_number, self.row_number, self.column_index, self.first_offending_value
        )
    }
}

/// Outcome of the numeric test for one data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Data,
    NonNumerical(ContextInfo),
}

/// A data line that passed the column check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow<'a> {
    pub line: &'a RawLine,
    pub columns: Vec<&'a str>,
    pub class: LineClass,
}

/// Header names plus every accepted data line, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput<'a> {
    pub variable_names: Vec<String>,
    pub rows: Vec<ValidatedRow<'a>>,
}

impl ValidatedInput<'_> {
    pub fn width(&self) -> usize {
        self.variable_names.len()
    }

    /// Rows that were accepted despite failing the numeric test.
    pub fn non_numerical_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row.class, LineClass::NonNumerical(_)))
            .count()
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding label. Labels `encoding_rs` does
/// not know fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(charset) => charset.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    if decoded.starts_with(BOM) {
        decoded[BOM.len_utf8()..].to_string()
    } else {
        decoded
    }
}

/// Split decoded text into [`RawLine`]s. `\r\n` endings are handled and a
/// trailing newline does not add an empty line.
pub fn load_lines(content: &str) -> Vec<RawLine> {
    content
        .lines()
        .enumerate()
        .map(|(index, text)| RawLine::new(index, text))
        .collect()
}

// =============================================================================
// Classification
// =============================================================================

/// True if the cell is blank or matches the numeric grammar.
pub fn is_acceptable_cell(cell: &str) -> bool {
    cell.trim().is_empty() || NUMERIC.is_match(cell)
}

/// Run the numeric test over a data line's cells.
pub fn classify_line(line: &RawLine, columns: &[&str]) -> LineClass {
    match columns.iter().position(|cell| !is_acceptable_cell(cell)) {
        None => LineClass::Data,
        Some(position) => LineClass::NonNumerical(ContextInfo {
            first_offending_value: columns[position].to_string(),
            column_index: position + 1,
            line_number: line.line_number,
            row_number: line.line_number - HEADER_LINES,
            raw_line_text: line.text.clone(),
        }),
    }
}

/// Checks data lines against the header's width and the numeric rules.
pub struct LineValidator<'c> {
    config: &'c Config,
    width: usize,
}

impl<'c> LineValidator<'c> {
    pub fn new(config: &'c Config, width: usize) -> Self {
        Self { config, width }
    }

    /// Validate one data line.
    ///
    /// Non-numerical lines are always reported to `sink`; they are then
    /// returned as accepted rows if the config ignores them, or as an error.
    pub fn check<'a>(
        &self,
        line: &'a RawLine,
        sink: &dyn DiagnosticSink,
    ) -> ValidationResult<ValidatedRow<'a>> {
        let columns = line.columns(self.config.column_splitter);
        if columns.len() != self.width {
            return Err(ValidationError::ColumnCountMismatch {
                line_number: line.line_number,
                found: columns.len(),
                expected: self.width,
            });
        }

        let class = classify_line(line, &columns);
        if let LineClass::NonNumerical(ref context) = class {
            sink.warn(&context.message());
            if !self.config.ignore_non_numerical {
                return Err(ValidationError::NonNumericalData(context.clone()));
            }
        }

        Ok(ValidatedRow { line, columns, class })
    }
}

/// Validate all lines, stopping at the first fatal problem.
pub fn validate_lines<'a>(
    lines: &'a [RawLine],
    config: &Config,
    sink: &dyn DiagnosticSink,
) -> ValidationResult<ValidatedInput<'a>> {
    let (header, data) = lines.split_first().ok_or(ValidationError::EmptyInput)?;

    let variable_names: Vec<String> = header
        .columns(config.column_splitter)
        .into_iter()
        .map(str::to_string)
        .collect();

    let validator = LineValidator::new(config, variable_names.len());
    let rows = data
        .iter()
        .map(|line| validator.check(line, sink))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(ValidatedInput { variable_names, rows })
}
