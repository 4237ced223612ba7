//! High-level pipeline API for survey export conversion.
//!
//! Combines all steps: loading, validation, value rewriting, script
//! generation and writing. A run is all-or-nothing: outputs are only
//! written once every line has been accepted.
//!
//! # Example
//!
//! ```rust,ignore
//! use mplusprep::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = Path::new("survey.txt");
//!     let report = convert_file(input, ConvertOptions::for_input(input))?;
//!     println!("Wrote {} rows", report.row_count);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::control::{duplicate_names, oversized_names, unlisted_names, ControlFileGenerator};
use crate::error::{PipelineResult, ValidationResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning, DiagnosticSink, LOG_BROADCASTER};
use crate::parser::{load_lines, validate_lines, RawLine};
use crate::storage::{ensure_absent, ensure_distinct, read_input, write_outputs, OutputPaths};
use super::values::ValueTransformer;

/// Variable names and rewritten data lines of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// Header cells, verbatim
    pub variable_names: Vec<String>,

    /// Rewritten data lines in input order, header excluded
    pub data_lines: Vec<String>,

    /// Data lines accepted despite non-numerical cells
    pub non_numerical_rows: usize,
}

impl Conversion {
    /// Data file contents.
    pub fn data_text(&self, newline: &str) -> String {
        self.data_lines.join(newline)
    }
}

/// Both output documents, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutput {
    pub conversion: Conversion,
    pub data: String,
    pub control: String,
}

/// Options for [`convert_file`]
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub config: Config,
    pub outputs: OutputPaths,
    /// Replace existing output files instead of failing
    pub overwrite: bool,
}

impl ConvertOptions {
    /// Default config, outputs next to the input.
    pub fn for_input(input: &Path) -> Self {
        Self {
            config: Config::default(),
            outputs: OutputPaths::for_input(input),
            overwrite: false,
        }
    }
}

/// Summary of a completed file conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub encoding: String,
    pub variable_names: Vec<String>,
    pub row_count: usize,
    pub non_numerical_rows: usize,
    pub data_path: PathBuf,
    pub control_path: PathBuf,
}

/// Validate and rewrite already-loaded lines.
///
/// Line 1 supplies the variable names; every later line becomes one data
/// line. Stops at the first column-count or numeric failure. Empty variable
/// names and names holding whitespace are reported to `sink`.
pub fn convert_lines(
    lines: &[RawLine],
    config: &Config,
    sink: &dyn DiagnosticSink,
) -> ValidationResult<Conversion> {
    let validated = validate_lines(lines, config, sink)?;

    for (column, name) in unlisted_names(&validated.variable_names) {
        if name.is_empty() {
            sink.warn(&format!(
                "Variable name in column {} is empty and will be missing from NAMES ARE",
                column
            ));
        } else {
            sink.warn(&format!(
                "Variable name '{}' in column {} contains whitespace and will be split in NAMES ARE",
                name, column
            ));
        }
    }

    let transformer = ValueTransformer::new(config);

    let data_lines = validated
        .rows
        .iter()
        .map(|row| transformer.line(&row.columns))
        .collect();

    Ok(Conversion {
        non_numerical_rows: validated.non_numerical_count(),
        variable_names: validated.variable_names,
        data_lines,
    })
}

/// Convert lines and render both documents.
pub fn render(
    lines: &[RawLine],
    data_file_name: &str,
    config: &Config,
    sink: &dyn DiagnosticSink,
) -> ValidationResult<ConversionOutput> {
    let conversion = convert_lines(lines, config, sink)?;
    let data = conversion.data_text(&config.newline);
    let control = ControlFileGenerator::new(config).generate(&conversion.variable_names, data_file_name);

    Ok(ConversionOutput { conversion, data, control })
}

/// Convert decoded text in memory.
pub fn convert_text(
    content: &str,
    data_file_name: &str,
    config: &Config,
    sink: &dyn DiagnosticSink,
) -> ValidationResult<ConversionOutput> {
    render(&load_lines(content), data_file_name, config, sink)
}

/// Convert a survey export file and write the data file and input script.
///
/// 1. Reads and decodes the input
/// 2. Refuses to run if an output would replace the input, if both outputs
///    share a path, or if an output exists (unless overwriting)
/// 3. Validates and rewrites every line
/// 4. Generates the input script
/// 5. Writes both outputs
pub fn convert_file(input: &Path, options: ConvertOptions) -> PipelineResult<ConvertReport> {
    let config = &options.config;
    config.validate()?;

    log_info(format!("📖 Reading {}", input.display()));
    let decoded = read_input(input)?;
    log_success(format!("Detected encoding: {}", decoded.encoding));
    log_success(format!("Read {} lines", decoded.lines.len()));

    ensure_distinct(input, &options.outputs)?;
    if !options.overwrite {
        ensure_absent(&options.outputs)?;
    }

    log_info("⚙️  Validating and transforming...");
    let output = render(
        &decoded.lines,
        &options.outputs.data_file_name(),
        config,
        &*LOG_BROADCASTER,
    )?;
    print_conversion(&output.conversion, config);

    write_outputs(&options.outputs, &output.data, &output.control)?;
    log_success(format!("Data written to {}", options.outputs.data.display()));
    log_success(format!("Input script written to {}", options.outputs.control.display()));

    Ok(ConvertReport {
        encoding: decoded.encoding,
        row_count: output.conversion.data_lines.len(),
        non_numerical_rows: output.conversion.non_numerical_rows,
        variable_names: output.conversion.variable_names,
        data_path: options.outputs.data,
        control_path: options.outputs.control,
    })
}

/// Validate a file without writing anything.
pub fn check_file(input: &Path, config: &Config) -> PipelineResult<Conversion> {
    config.validate()?;
    let decoded = read_input(input)?;
    let conversion = convert_lines(&decoded.lines, config, &*LOG_BROADCASTER)?;
    print_conversion(&conversion, config);
    Ok(conversion)
}

fn print_conversion(conversion: &Conversion, config: &Config) {
    log_success(format!(
        "{} variables, {} data rows",
        conversion.variable_names.len(),
        conversion.data_lines.len()
    ));

    if conversion.non_numerical_rows > 0 {
        log_warning(format!(
            "{} rows with non-numerical values kept as data",
            conversion.non_numerical_rows
        ));
    }

    let oversized = oversized_names(&conversion.variable_names, config.max_header_length);
    if !oversized.is_empty() {
        log_warning(format!(
            "{} variable names longer than {} characters",
            oversized.len(),
            config.max_header_length
        ));
        for name in oversized.iter().take(5) {
            log_info_indent(*name, 1);
        }
    }

    let duplicates = duplicate_names(&conversion.variable_names);
    if !duplicates.is_empty() {
        log_warning(format!("Duplicate variable names: {}", duplicates.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::logs::CollectingSink;

    fn lines(texts: &[&str]) -> Vec<RawLine> {
        texts.iter().enumerate().map(|(i, t)| RawLine::new(i, *t)).collect()
    }

    #[test]
    fn test_scenario_basic_conversion() {
        let input = lines(&["ID\tAGE\tSEX", "1\t23\t0", "2\t45\t1"]);
        let output = render(&input, "survey.dat", &Config::default(), &CollectingSink::new()).unwrap();

        assert_eq!(output.data, "1\t23\t0\n2\t45\t1");
        assert_eq!(output.conversion.variable_names, vec!["ID", "AGE", "SEX"]);
        assert!(output.control.contains("ID AGE SEX;"));
        assert!(output.control.contains("IDVARIABLE IS ID;"));
        assert!(output.control.contains("FILE IS survey.dat;"));
    }

    #[test]
    fn test_scenario_column_mismatch() {
        let input = lines(&["ID\tAGE\tSEX", "1\t23"]);
        let err = convert_lines(&input, &Config::default(), &CollectingSink::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ColumnCountMismatch { line_number: 2, found: 2, expected: 3 }
        );
    }

    #[test]
    fn test_scenario_non_numerical_fails() {
        let input = lines(&["ID\tAGE\tSEX", "1\t23\t0", "2\tN/A\t1"]);
        let sink = CollectingSink::new();
        let err = convert_lines(&input, &Config::default(), &sink).unwrap_err();

        match err {
            ValidationError::NonNumericalData(context) => {
                assert_eq!(context.first_offending_value, "N/A");
                assert_eq!(context.column_index, 2);
                assert_eq!(context.line_number, 3);
                assert_eq!(context.row_number, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_scenario_non_numerical_ignored() {
        let config = Config { ignore_non_numerical: true, ..Config::default() };
        let input = lines(&["ID\tAGE\tSEX", "1\t23\t0", "2\tN/A\t1"]);
        let sink = CollectingSink::new();
        let conversion = convert_lines(&input, &config, &sink).unwrap();

        assert_eq!(conversion.data_lines, vec!["1\t23\t0", "2\tN/A\t1"]);
        assert_eq!(conversion.non_numerical_rows, 1);
        assert_eq!(sink.messages().len(), 1);
        assert!(sink.messages()[0].contains("N/A"));
    }

    #[test]
    fn test_scenario_oversized_name() {
        let input = lines(&["RESPONDENTID\tAGE", "1\t2"]);
        let output = render(&input, "d.dat", &Config::default(), &CollectingSink::new()).unwrap();
        let first_section = output.control.split("\n\n").next().unwrap();
        assert!(first_section.contains("RESPONDENTID"));
        assert!(first_section.starts_with("! Variable names longer than 8"));
    }

    #[test]
    fn test_order_is_preserved() {
        let texts: Vec<String> = std::iter::once("N".to_string())
            .chain((0..50).rev().map(|i| i.to_string()))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let conversion = convert_lines(&lines(&refs), &Config::default(), &CollectingSink::new()).unwrap();
        assert_eq!(conversion.data_lines, refs[1..].to_vec());
    }

    #[test]
    fn test_values_are_rewritten() {
        let input = lines(&["A\tB\tC", "1,5\t\t3"]);
        let conversion = convert_lines(&input, &Config::default(), &CollectingSink::new()).unwrap();
        assert_eq!(conversion.data_lines, vec!["1.5\t-999\t3"]);
    }

    #[test]
    fn test_header_only_input() {
        let input = lines(&["A\tB"]);
        let output = render(&input, "d.dat", &Config::default(), &CollectingSink::new()).unwrap();
        assert_eq!(output.data, "");
        assert!(output.control.contains("NAMES ARE"));
    }

    #[test]
    fn test_convert_text_handles_crlf() {
        let output = convert_text("A\tB\r\n1\t2\r\n", "d.dat", &Config::default(), &CollectingSink::new()).unwrap();
        assert_eq!(output.data, "1\t2");
    }

    #[test]
    fn test_unlisted_variable_names_are_reported() {
        let input = lines(&["ID\tAGE\t", "1\t23\t4"]);
        let sink = CollectingSink::new();
        let output = render(&input, "survey.dat", &Config::default(), &sink).unwrap();

        assert_eq!(output.conversion.variable_names, vec!["ID", "AGE", ""]);
        assert_eq!(output.data, "1\t23\t4");
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("column 3 is empty"));
    }

    #[test]
    fn test_name_with_space_is_reported() {
        let config = Config { column_splitter: ';', ..Config::default() };
        let input = lines(&["ID;Q 1", "1;2"]);
        let sink = CollectingSink::new();
        convert_lines(&input, &config, &sink).unwrap();

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'Q 1'"));
        assert!(messages[0].contains("column 2"));
    }

    #[test]
    fn test_convert_file_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        std::fs::write(&input, "ID\tAGE\tSEX\n1\t23\t0\n2\t45\t1\n").unwrap();

        let report = convert_file(&input, ConvertOptions::for_input(&input)).unwrap();
        assert_eq!(report.row_count, 2);
        assert_eq!(std::fs::read_to_string(&report.data_path).unwrap(), "1\t23\t0\n2\t45\t1");

        let control = std::fs::read_to_string(&report.control_path).unwrap();
        assert!(control.contains("FILE IS survey.dat;"));
        assert!(control.contains("IDVARIABLE IS ID;"));
    }

    #[test]
    fn test_convert_file_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        std::fs::write(&input, "A\n1\n").unwrap();
        let options = ConvertOptions::for_input(&input);
        std::fs::write(&options.outputs.data, "old").unwrap();

        let err = convert_file(&input, options.clone()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PipelineError::Storage(crate::error::StorageError::OutputAlreadyExists(_))
        ));
        assert!(!options.outputs.control.exists());

        let overwrite = ConvertOptions { overwrite: true, ..options };
        let report = convert_file(&input, overwrite).unwrap();
        assert_eq!(std::fs::read_to_string(&report.data_path).unwrap(), "1");
    }

    #[test]
    fn test_convert_file_never_overwrites_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.dat");
        std::fs::write(&input, "ID\tAGE\n1\t2,5\n").unwrap();
        let options = ConvertOptions { overwrite: true, ..ConvertOptions::for_input(&input) };

        let err = convert_file(&input, options.clone()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PipelineError::Storage(crate::error::StorageError::OutputIsInput(_))
        ));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), "ID\tAGE\n1\t2,5\n");
        assert!(!options.outputs.control.exists());
    }

    #[test]
    fn test_convert_file_rejects_shared_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        std::fs::write(&input, "A\n1\n").unwrap();
        let target = dir.path().join("out.txt");
        let mut options = ConvertOptions::for_input(&input);
        options.outputs = options.outputs.with_overrides(Some(target.clone()), Some(target.clone()));

        let err = convert_file(&input, options).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PipelineError::Storage(crate::error::StorageError::OutputsCollide(_))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_convert_file_writes_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.txt");
        std::fs::write(&input, "A\tB\tC\n1\t2\n").unwrap();
        let options = ConvertOptions::for_input(&input);

        let err = convert_file(&input, options.clone()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PipelineError::Validation(ValidationError::ColumnCountMismatch { .. })
        ));
        assert!(!options.outputs.data.exists());
        assert!(!options.outputs.control.exists());
    }

    #[test]
    fn test_convert_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.txt");
        let err = convert_file(&input, ConvertOptions::for_input(&input)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_data_text_uses_newline() {
        let conversion = Conversion {
            variable_names: vec!["A".into()],
            data_lines: vec!["1".into(), "2".into()],
            non_numerical_rows: 0,
        };
        assert_eq!(conversion.data_text("\r\n"), "1\r\n2");
    }
}
