//! Cell rewriting for data lines.
//!
//! Substitutions run one after another, each on the output of the previous
//! one, then blank cells are replaced by the missing-value token.

use crate::config::{Config, Replacement};

/// Rewrites the cells of validated data lines.
#[derive(Debug, Clone, Copy)]
pub struct ValueTransformer<'c> {
    config: &'c Config,
}

impl<'c> ValueTransformer<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    /// Apply substitutions and missing-value handling to a single cell.
    pub fn cell(&self, cell: &str) -> String {
        let replaced = apply_replacements(cell, &self.config.replacements);

        match self.config.empty_replacement {
            Some(ref token) if replaced.trim().is_empty() => token.clone(),
            _ => replaced,
        }
    }

    /// Transform every cell and join them with the configured joiner.
    pub fn line(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|cell| self.cell(cell))
            .collect::<Vec<_>>()
            .join(&self.config.column_joiner)
    }
}

/// Sequentially apply each replacement to every non-overlapping occurrence.
pub fn apply_replacements(value: &str, replacements: &[Replacement]) -> String {
    replacements
        .iter()
        .fold(value.to_string(), |acc, r| acc.replace(&r.from, &r.to))
}
