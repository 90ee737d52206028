//! Translator configuration.
//!
//! Loaded from TOML; every field has a default so an empty file (or no file)
//! is a valid configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::NlqError;
use crate::translate::predicate::DateField;

/// Errors from loading or validating a [`TranslatorConfig`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read translator config: {path}")]
    #[diagnostic(
        code(nlq::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse translator config: {path}")]
    #[diagnostic(
        code(nlq::config::parse),
        help("The config file must be valid TOML: {message}")
    )]
    Parse { path: String, message: String },

    #[error("invalid config value for `{field}`: {message}")]
    #[diagnostic(
        code(nlq::config::invalid_value),
        help("Fix the value in the config file or remove it to use the default.")
    )]
    InvalidValue { field: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Output query dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Nuxeo Query Language.
    #[default]
    Nxql,
    /// Elasticsearch search request body (JSON).
    #[serde(alias = "es")]
    Elasticsearch,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nxql => f.write_str("nxql"),
            Self::Elasticsearch => f.write_str("elasticsearch"),
        }
    }
}

impl FromStr for Dialect {
    type Err = NlqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nxql" => Ok(Self::Nxql),
            "elasticsearch" | "es" => Ok(Self::Elasticsearch),
            _ => Err(NlqError::UnknownDialect {
                name: s.to_string(),
            }),
        }
    }
}

/// Tunables for the translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Page size used when a page index is requested without a size.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound for any resolved or requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Date field used when a time cue has no `created`/`modified` prefix.
    #[serde(default)]
    pub default_date_field: DateField,
    /// Turn unrecognized words into a full-text search.
    #[serde(default = "default_true")]
    pub fallback_fulltext: bool,
    #[serde(default)]
    pub dialect: Dialect,
    /// Extra word → document type name mappings, e.g. `contract = "Contract"`.
    #[serde(default)]
    pub type_synonyms: BTreeMap<String, String>,
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            default_date_field: DateField::default(),
            fallback_fulltext: true,
            dialect: Dialect::default(),
            type_synonyms: BTreeMap::new(),
        }
    }
}

impl TranslatorConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_page_size == 0 {
            return Err(invalid("default_page_size", "must be greater than zero"));
        }
        if self.max_page_size == 0 {
            return Err(invalid("max_page_size", "must be greater than zero"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(invalid(
                "default_page_size",
                format!(
                    "{} exceeds max_page_size {}",
                    self.default_page_size, self.max_page_size
                ),
            ));
        }
        for (word, type_name) in &self.type_synonyms {
            if word.trim().is_empty() || word.chars().any(char::is_whitespace) {
                return Err(invalid(
                    "type_synonyms",
                    format!("synonym \"{word}\" must be a single word"),
                ));
            }
            if !is_identifier(type_name) {
                return Err(invalid(
                    "type_synonyms",
                    format!("type name \"{type_name}\" is not an identifier"),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Document type names are interpolated into queries, so only plain
/// identifiers are accepted.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
