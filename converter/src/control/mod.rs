//! Mplus input script generation.
//!
//! The script is built from up to five sections, in this order, separated by
//! a blank line. Sections with nothing to say are left out.
//!
//! ```text
//! ! Variable names longer than 8 characters:
//! ! RESPONDENT_AGE
//!
//! ! Duplicate variable names (case-insensitive):
//! ! Age
//!
//! DATA:
//!         FILE IS survey.dat;
//!
//! VARIABLE:
//!         NAMES ARE
//!                 ID Age age RESPONDENT_AGE;
//!         IDVARIABLE IS ID;
//!         MISSING ARE ALL (-999);
//!
//! ANALYSIS:
//!         TYPE IS BASIC;
//! ```

use std::collections::{HashMap, HashSet};
use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};

use crate::config::Config;

/// Prefix of every warning comment line.
const COMMENT_MARKER: &str = "! ";

/// Statement terminator.
const TERMINATOR: char = ';';

/// Builds the input script for a converted data file.
#[derive(Debug, Clone, Copy)]
pub struct ControlFileGenerator<'c> {
    config: &'c Config,
}

impl<'c> ControlFileGenerator<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    /// Render the full script.
    pub fn generate(&self, variable_names: &[String], data_file_name: &str) -> String {
        let sections = [
            self.oversized_section(variable_names),
            self.duplicate_section(variable_names),
            Some(self.data_section(data_file_name)),
            self.variable_section(variable_names),
            Some(self.analysis_section()),
        ];

        let separator = self.config.newline.repeat(2);
        sections
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(&separator)
    }

    fn oversized_section(&self, names: &[String]) -> Option<String> {
        let oversized = oversized_names(names, self.config.max_header_length);
        self.warning_block(
            &format!(
                "Variable names longer than {} characters:",
                self.config.max_header_length
            ),
            &oversized,
        )
    }

    fn duplicate_section(&self, names: &[String]) -> Option<String> {
        let duplicates = duplicate_names(names);
        self.warning_block("Duplicate variable names (case-insensitive):", &duplicates)
    }

    fn warning_block(&self, title: &str, names: &[&str]) -> Option<String> {
        if names.is_empty() {
            return None;
        }

        let listing = self.wrap(&names.join(", "), COMMENT_MARKER);
        Some(format!(
            "{}{}{}{}",
            COMMENT_MARKER, title, self.config.newline, listing
        ))
    }

    fn data_section(&self, data_file_name: &str) -> String {
        format!(
            "DATA:{}{}FILE IS {}{}",
            self.config.newline, self.config.indent, data_file_name, TERMINATOR
        )
    }

    fn variable_section(&self, names: &[String]) -> Option<String> {
        let missing = self.config.empty_replacement.as_deref();
        if names.is_empty() && missing.is_none() {
            return None;
        }

        let indent = &self.config.indent;
        let mut lines = vec!["VARIABLE:".to_string()];

        if let Some(first) = names.first() {
            lines.push(format!("{}NAMES ARE", indent));

            let mut segments = wrap_segments(&names.join(" "), self.config.max_line_length);
            match segments.last_mut() {
                Some(last) => last.push(TERMINATOR),
                None => segments.push(TERMINATOR.to_string()),
            }
            let name_indent = indent.repeat(2);
            lines.extend(segments.into_iter().map(|s| format!("{}{}", name_indent, s)));

            lines.push(format!("{}IDVARIABLE IS {}{}", indent, first, TERMINATOR));
        }

        if let Some(token) = missing {
            lines.push(format!("{}MISSING ARE ALL ({}){}", indent, token, TERMINATOR));
        }

        Some(lines.join(&self.config.newline))
    }

    fn analysis_section(&self) -> String {
        format!(
            "ANALYSIS:{}{}TYPE IS {}{}",
            self.config.newline, self.config.indent, self.config.analysis_type, TERMINATOR
        )
    }

    fn wrap(&self, text: &str, prefix: &str) -> String {
        wrap(text, self.config.max_line_length, prefix, &self.config.newline)
    }
}

/// Names whose character count exceeds `max_length`, in input order.
pub fn oversized_names(names: &[String], max_length: usize) -> Vec<&str> {
    names
        .iter()
        .filter(|name| name.chars().count() > max_length)
        .map(String::as_str)
        .collect()
}

/// First occurrence of every name that appears more than once, ignoring
/// case. Ordered by first occurrence.
pub fn duplicate_names(names: &[String]) -> Vec<&str> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in names {
        *counts.entry(name.to_lowercase()).or_default() += 1;
    }

    let mut reported = Vec::new();
    let mut seen = HashSet::new();
    for name in names {
        let key = name.to_lowercase();
        if counts[&key] > 1 && seen.insert(key) {
            reported.push(name.as_str());
        }
    }
    reported
}

/// Names that cannot be listed in `NAMES ARE` as they are: empty ones drop
/// out of the list and ones holding whitespace split into several names.
/// Returned with their 1-based column.
pub fn unlisted_names(names: &[String]) -> Vec<(usize, &str)> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.is_empty() || name.chars().any(char::is_whitespace))
        .map(|(index, name)| (index + 1, name.as_str()))
        .collect()
}

/// Greedily pack whitespace-separated tokens into segments of at most
/// `max_length` columns of display width. A token longer than the limit gets
/// a segment of its own and is never split.
pub fn wrap_segments(text: &str, max_length: usize) -> Vec<String> {
    let tokens = text.split_whitespace().collect::<Vec<_>>();
    if tokens.is_empty() {
        return Vec::new();
    }

    let options = Options::new(max_length)
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit);

    textwrap::wrap(&tokens.join(" "), &options)
        .into_iter()
        .map(|segment| segment.into_owned())
        .collect()
}

/// Wrap `text` and join the segments with `newline`, each one prefixed.
pub fn wrap(text: &str, max_length: usize, prefix: &str, newline: &str) -> String {
    wrap_segments(text, max_length)
        .iter()
        .map(|segment| format!("{}{}", prefix, segment))
        .collect::<Vec<_>>()
        .join(newline)
}
