//! Natural-language to structured-query translation.
//!
//! ## Architecture
//!
//! ```text
//! raw text ──→ Normalizer ──→ Resolvers (fixed order) ──→ Composer ──→ ParseResult
//!                  │              │                          │             │
//!            quoted literals   Lexicon                  defaults,      Renderer
//!            → placeholders    Calendar                 fallback     (NXQL | ES)
//!                                                                          │
//!                                                            Explainer ←───┘
//! ```
//!
//! Translation never fails. Unrecognized input degrades to a generic
//! document query, optionally with a full-text search of the leftover words.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use nxql_translate::config::TranslatorConfig;
//! use nxql_translate::translate::{TranslateRequest, Translator};
//!
//! let translator = Translator::new(TranslatorConfig::default());
//! let now = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap().and_hms_opt(15, 30, 0).unwrap();
//! let out = translator.run(&TranslateRequest::new("draft invoices from this week", now).explain(true));
//! println!("{}", out.query);
//! ```

pub mod calendar;
pub mod compose;
pub mod explain;
pub mod intent;
pub mod lexicon;
pub mod normalize;
pub mod predicate;
pub mod render;
pub mod resolve;

use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::{Dialect, TranslatorConfig};

pub use lexicon::Lexicon;
pub use normalize::{NormalizedInput, Span};
pub use predicate::{
    Category, ContentMatch, ContentTarget, DateField, DateRange, Direction, DocType, LimitSpec,
    Operator, ParseResult, PathFilter, Predicate, Resolved, SearchIndex, SortField, SortSpec,
    StateFilter, TraceEntry, TypeFilter, UserFilter, UserRole,
};
pub use render::elastic::BodyOptions;
use resolve::{ResolveContext, Resolver};

/// A translation request with caller overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    /// Reference instant for relative dates, in the caller's local calendar.
    pub now: NaiveDateTime,
    pub explain: bool,
    /// Overrides any resolved page size.
    pub page_size: Option<u32>,
    /// Zero-based; overrides any resolved page index.
    pub page_index: Option<u32>,
    /// Identity substituted for "my"/"mine".
    pub caller: Option<String>,
    /// Falls back to the configured dialect.
    pub dialect: Option<Dialect>,
    /// Overrides index detection.
    pub index: Option<SearchIndex>,
    /// Elasticsearch only: highlight snippets and `_source` filtering.
    pub body: BodyOptions,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            text: text.into(),
            now,
            explain: false,
            page_size: None,
            page_index: None,
            caller: None,
            dialect: None,
            index: None,
            body: BodyOptions::default(),
        }
    }

    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page_index(mut self, page_index: u32) -> Self {
        self.page_index = Some(page_index);
        self
    }

    pub fn caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn index(mut self, index: SearchIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.body.highlight = highlight;
        self
    }

    pub fn source_includes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.source_includes = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_excludes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.source_excludes = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// The rendered outcome of a [`TranslateRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub query: String,
    pub dialect: Dialect,
    pub index: SearchIndex,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Vec<String>>,
    /// Effective sort for the repository executor.
    pub sort: Option<SortSpec>,
    /// Effective page specification after caller overrides.
    pub limit: Option<LimitSpec>,
    pub result: ParseResult,
}

/// Rule-based translator. Build once, share freely: it is `Send + Sync` and
/// every call is independent.
pub struct Translator {
    config: TranslatorConfig,
    lexicon: Lexicon,
    resolvers: Vec<Box<dyn Resolver>>,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        let lexicon = Lexicon::default_english().with_synonyms(&config.type_synonyms);
        Self {
            config,
            lexicon,
            resolvers: resolve::standard_resolvers(),
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Parse `text` relative to `now`.
    pub fn translate(&self, text: &str, now: NaiveDateTime) -> ParseResult {
        self.parse(text, now, None, None)
    }

    /// Parse `text` with a known caller identity for "my"/"mine".
    pub fn translate_as(&self, text: &str, now: NaiveDateTime, caller: Option<&str>) -> ParseResult {
        self.parse(text, now, caller, None)
    }

    /// Parse, apply caller overrides, and render.
    pub fn run(&self, request: &TranslateRequest) -> Translation {
        let dialect = request.dialect.unwrap_or(self.config.dialect);
        let mut result = self.parse(&request.text, request.now, request.caller.as_deref(), request.index);
        result.limit = self.effective_limit(result.limit, request);
        if let Some(limit) = result.limit {
            for entry in result.trace.iter_mut().filter(|e| e.category == Category::Limit) {
                entry.resolved = Resolved::Limit(limit);
            }
        }

        let query = render::render(&result, dialect, self.config.default_page_size, &request.body);
        let explanation = request
            .explain
            .then(|| explain::explain(&result, dialect, &query));

        Translation {
            query,
            dialect,
            index: result.index,
            summary: explain::summary(&result),
            explanation,
            sort: result.sort,
            limit: result.limit,
            result,
        }
    }

    /// Caller page size and index take precedence over resolved ones.
    fn effective_limit(&self, resolved: Option<LimitSpec>, request: &TranslateRequest) -> Option<LimitSpec> {
        if request.page_size.is_none() && request.page_index.is_none() {
            return resolved;
        }
        let page_size = request
            .page_size
            .filter(|&n| n > 0)
            .or(resolved.map(|l| l.page_size))
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        let page_index = request.page_index.or(resolved.and_then(|l| l.page_index));
        Some(LimitSpec {
            page_size,
            page_index,
        })
    }

    fn parse(
        &self,
        text: &str,
        now: NaiveDateTime,
        caller: Option<&str>,
        index: Option<SearchIndex>,
    ) -> ParseResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let input = NormalizedInput::new(text);
            let index = index.unwrap_or_else(|| intent::detect_index(&input));
            if input.is_empty() {
                return ParseResult {
                    index,
                    ..ParseResult::empty()
                };
            }
            let ctx = ResolveContext {
                lexicon: &self.lexicon,
                now,
                caller,
                default_date_field: self.config.default_date_field,
                default_page_size: self.config.default_page_size,
                max_page_size: self.config.max_page_size,
            };
            compose::compose(&input, &self.resolvers, &ctx, self.config.fallback_fulltext, index)
        }));

        outcome.unwrap_or_else(|_| {
            tracing::error!(input = text, "translation panicked, using the safe default query");
            safe_default(text, self.config.fallback_fulltext)
        })
    }
}

/// Generic type plus, when enabled, a full-text search of the trimmed input.
fn safe_default(text: &str, fallback_fulltext: bool) -> ParseResult {
    let mut result = ParseResult::empty();
    let value = text.trim();
    if fallback_fulltext && !value.is_empty() {
        result.predicates.push(Predicate::Content(ContentMatch {
            target: ContentTarget::FullText,
            op: Operator::Contains,
            value: value.to_string(),
        }));
    }
    result
}
