//! Rich diagnostic error types for nxql-translate.
//!
//! Translation itself never fails: every input yields a renderable query.
//! Errors only exist at the edges of the crate (loading configuration,
//! parsing command-line values), and each variant carries a miette
//! `#[diagnostic]` with a code and help text.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for nxql-translate.
#[derive(Debug, Error, Diagnostic)]
pub enum NlqError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown query dialect: \"{name}\"")]
    #[diagnostic(
        code(nlq::unknown_dialect),
        help("Supported dialects: \"nxql\" and \"elasticsearch\" (alias \"es\").")
    )]
    UnknownDialect { name: String },

    #[error("unknown search index: \"{name}\"")]
    #[diagnostic(
        code(nlq::unknown_index),
        help("Supported indexes: \"repository\" and \"audit\".")
    )]
    UnknownIndex { name: String },

    #[error("invalid reference time: \"{value}\"")]
    #[diagnostic(
        code(nlq::invalid_reference_time),
        help(
            "Pass the reference instant as an ISO local date-time \
             (\"2024-06-12T15:30:00\") or a plain date (\"2024-06-12\")."
        )
    )]
    InvalidReferenceTime { value: String },
}

/// Convenience result type.
pub type NlqResult<T> = std::result::Result<T, NlqError>;
