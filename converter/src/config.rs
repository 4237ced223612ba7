//! Conversion configuration.
//!
//! A [`Config`] is built once (defaults, optionally overlaid by a JSON file
//! and CLI flags) and then only read for the rest of the run.
//!
//! ```json
//! {
//!   "replacements": [{ "from": ",", "to": "." }],
//!   "emptyReplacement": "-999",
//!   "maxHeaderLength": 8,
//!   "ignoreNonNumerical": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the default config file path.
pub const CONFIG_ENV_VAR: &str = "MPLUSPREP_CONFIG";

/// A literal substitution applied to every data cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Options controlling classification, value rewriting and script output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Substitutions applied in order to every data cell
    pub replacements: Vec<Replacement>,

    /// Token written for blank cells (`None` keeps blanks as they are)
    pub empty_replacement: Option<String>,

    /// Variable names longer than this are flagged in the script
    pub max_header_length: usize,

    /// Wrap width for generated script lines
    pub max_line_length: usize,

    /// Value of the `TYPE IS` analysis directive
    pub analysis_type: String,

    /// Line separator used in both outputs
    pub newline: String,

    /// Indentation for script directives
    #[serde(alias = "defaultIndent")]
    pub indent: String,

    /// Separator placed between cells in the data file
    pub column_joiner: String,

    /// Character the input lines are split on
    pub column_splitter: char,

    /// Accept non-numerical data lines with a warning instead of failing
    pub ignore_non_numerical: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            replacements: vec![Replacement::new(",", ".")],
            empty_replacement: Some("-999".to_string()),
            max_header_length: 8,
            max_line_length: 80,
            analysis_type: "BASIC".to_string(),
            newline: "\n".to_string(),
            indent: "\t\t".to_string(),
            column_joiner: "\t".to_string(),
            column_splitter: '\t',
            ignore_non_numerical: false,
        }
    }
}

impl Config {
    /// Parse a config from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the generator or transformer cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maxLineLength".into(),
                message: "must be greater than 0".into(),
            });
        }

        if let Some(index) = self.replacements.iter().position(|r| r.from.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("replacements[{}].from", index),
                message: "must not be empty".into(),
            });
        }

        if self.newline.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "newline".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(())
    }
}
