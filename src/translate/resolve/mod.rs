//! Cue resolvers.
//!
//! Each resolver recognizes the phrases of one category and reports candidate
//! [`Hit`]s. The composer runs them in the fixed order of
//! [`standard_resolvers`]; every span a resolver reports is claimed, and later
//! resolvers never see claimed text. Candidate spans always start and end on
//! token boundaries, so a cue can never fire inside a path or a literal
//! placeholder.

pub mod content;
pub mod doc_type;
pub mod limit;
pub mod path;
pub mod sort;
pub mod state;
pub mod time;
pub mod user;

use chrono::NaiveDateTime;

use super::lexicon::Lexicon;
use super::normalize::{NormalizedInput, Span};
use super::predicate::{Category, DateField, Resolved};

/// A candidate interpretation of a span of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub category: Category,
    pub span: Span,
    pub resolved: Resolved,
    /// Higher wins within a category.
    pub priority: u8,
}

/// Per-call inputs shared by every resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub lexicon: &'a Lexicon,
    pub now: NaiveDateTime,
    /// Identity substituted for "my"/"mine".
    pub caller: Option<&'a str>,
    pub default_date_field: DateField,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// Recognizer for one category of cues.
pub trait Resolver: Send + Sync {
    fn category(&self) -> Category;

    /// Report zero or more candidates. Must not panic on any input and must
    /// not report spans overlapping `claimed`.
    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], ctx: &ResolveContext<'_>) -> Vec<Hit>;
}

/// The resolvers in run order: Content, Path, Limit, State, Sort, Time, User, Type.
pub fn standard_resolvers() -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(content::ContentResolver),
        Box::new(path::PathResolver),
        Box::new(limit::LimitResolver),
        Box::new(state::StateResolver),
        Box::new(sort::SortResolver),
        Box::new(time::TimeResolver),
        Box::new(user::UserResolver),
        Box::new(doc_type::TypeResolver),
    ]
}

/// Collects one resolver's candidates, rejecting spans that are misaligned
/// with tokens or overlap claimed text or an earlier candidate.
pub(crate) struct Candidates<'a> {
    input: &'a NormalizedInput,
    claimed: &'a [Span],
    hits: Vec<Hit>,
}

impl<'a> Candidates<'a> {
    pub(crate) fn new(input: &'a NormalizedInput, claimed: &'a [Span]) -> Self {
        Self {
            input,
            claimed,
            hits: Vec::new(),
        }
    }

    /// Whether `span` could still be offered.
    pub(crate) fn is_free(&self, span: Span) -> bool {
        !span.is_empty()
            && self.aligned(span)
            && !span.overlaps_any(self.claimed)
            && !self.hits.iter().any(|h| h.span.overlaps(&span))
    }

    pub(crate) fn offer(&mut self, span: Span, resolved: Resolved, priority: u8) -> bool {
        if !self.is_free(span) {
            return false;
        }
        self.hits.push(Hit {
            category: resolved.category(),
            span,
            resolved,
            priority,
        });
        true
    }

    pub(crate) fn into_hits(mut self) -> Vec<Hit> {
        self.hits.sort_by_key(|h| h.span);
        self.hits
    }

    fn aligned(&self, span: Span) -> bool {
        let tokens = &self.input.tokens;
        tokens.iter().any(|t| t.span.start == span.start) && tokens.iter().any(|t| t.span.end == span.end)
    }
}

/// Span of a regex match.
pub(crate) fn span_of(m: &regex::Match<'_>) -> Span {
    Span::new(m.start(), m.end())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    /// Wednesday 2024-06-12 15:30:00.
    pub fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    pub fn ctx(lexicon: &Lexicon) -> ResolveContext<'_> {
        ResolveContext {
            lexicon,
            now: now(),
            caller: None,
            default_date_field: DateField::Modified,
            default_page_size: 20,
            max_page_size: 1000,
        }
    }

    /// Run a single resolver over `text` with nothing claimed.
    pub fn run(resolver: &dyn Resolver, text: &str) -> (NormalizedInput, Vec<Hit>) {
        let lexicon = Lexicon::default_english();
        let input = NormalizedInput::new(text);
        let hits = resolver.attempt(&input, &[], &ctx(&lexicon));
        (input, hits)
    }
}
