//! # nxql-translate
//!
//! Deterministic, rule-based translation of natural-language search requests
//! into structured repository queries.
//!
//! A sentence such as `draft invoices created by john last week sorted by title`
//! becomes an injection-safe NXQL query (or an Elasticsearch request body), an
//! effective sort and page specification, and a trace explaining which phrase
//! produced which clause.
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use nxql_translate::config::TranslatorConfig;
//! use nxql_translate::translate::Translator;
//!
//! let translator = Translator::new(TranslatorConfig::default());
//! let now = NaiveDate::from_ymd_opt(2024, 6, 12)
//!     .unwrap()
//!     .and_hms_opt(15, 30, 0)
//!     .unwrap();
//! let result = translator.translate("find all invoices", now);
//! assert_eq!(result.predicates.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod translate;
