//! Structured query model: predicates, sort and limit specs, trace entries.
//!
//! A [`ParseResult`] is the complete output of one translation: a canonical
//! list of predicates (at most one per [`Category`]), an optional sort, an
//! optional limit, and the trace of which phrase produced which item.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::normalize::Span;
use crate::error::NlqError;

/// Predicate and modifier categories.
///
/// Variant order is the canonical clause order used by the composer and the
/// renderers: type, state, time, user, content, path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Type,
    State,
    Time,
    User,
    Content,
    Path,
    Sort,
    Limit,
}

impl Category {
    /// Whether this category produces a filter predicate (as opposed to sort/limit).
    pub fn is_predicate(self) -> bool {
        !matches!(self, Self::Sort | Self::Limit)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::State => "state",
            Self::Time => "time",
            Self::User => "user",
            Self::Content => "content",
            Self::Path => "path",
            Self::Sort => "sort",
            Self::Limit => "limit",
        };
        f.write_str(name)
    }
}

/// Comparison operators carried by predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Equals,
    Contains,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    StartsWith,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::StartsWith => "starts with",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

/// Repository document types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// The generic document type, used when no type cue was recognized.
    Document,
    Invoice,
    File,
    Folder,
    Note,
    Workspace,
    Picture,
    Video,
    Audio,
    /// A type name registered through configuration.
    Custom(String),
}

impl DocType {
    /// The repository type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Document => "Document",
            Self::Invoice => "Invoice",
            Self::File => "File",
            Self::Folder => "Folder",
            Self::Note => "Note",
            Self::Workspace => "Workspace",
            Self::Picture => "Picture",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Custom(name) => name,
        }
    }

    /// Map a type name to a known variant, falling back to [`DocType::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Document" => Self::Document,
            "Invoice" => Self::Invoice,
            "File" => Self::File,
            "Folder" => Self::Folder,
            "Note" => Self::Note,
            "Workspace" => Self::Workspace,
            "Picture" => Self::Picture,
            "Video" => Self::Video,
            "Audio" => Self::Audio,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Document)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Restricts results to one document type, optionally with a file format hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeFilter {
    pub doc_type: DocType,
    /// MIME type of the main blob (e.g. `application/pdf` for "pdfs").
    pub format: Option<String>,
}

impl TypeFilter {
    pub fn generic() -> Self {
        Self {
            doc_type: DocType::Document,
            format: None,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle states, named by their user-facing vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Draft,
    Published,
    Archived,
    Locked,
}

impl Lifecycle {
    /// The repository lifecycle state value.
    pub fn state_name(self) -> &'static str {
        match self {
            Self::Draft => "project",
            Self::Published => "approved",
            Self::Archived => "obsolete",
            Self::Locked => "locked",
        }
    }
}

/// Version facet of the state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionFacet {
    Latest,
    Version,
    NotVersion,
}

/// Conjunction of lifecycle and system-flag facets.
///
/// All state cues of a sentence fold into one filter; a later cue for the
/// same facet replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateFilter {
    pub lifecycle: Option<Lifecycle>,
    pub trashed: Option<bool>,
    pub version: Option<VersionFacet>,
    pub proxy: Option<bool>,
    pub checked_in: Option<bool>,
    /// Set by the "active" cue, which also implies `trashed == Some(false)`.
    pub active: bool,
}

impl StateFilter {
    pub fn is_empty(&self) -> bool {
        self.lifecycle.is_none()
            && self.trashed.is_none()
            && self.version.is_none()
            && self.proxy.is_none()
            && self.checked_in.is_none()
            && !self.active
    }

    /// Overlay `other` onto `self`: every facet set in `other` wins.
    pub fn merge(&mut self, other: &StateFilter) {
        if other.lifecycle.is_some() {
            self.lifecycle = other.lifecycle;
        }
        if other.trashed.is_some() {
            self.trashed = other.trashed;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }
        if other.checked_in.is_some() {
            self.checked_in = other.checked_in;
        }
        self.active |= other.active;
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Which timestamp a date range applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Created,
    #[default]
    Modified,
}

/// Upper bound of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeEnd {
    pub at: NaiveDateTime,
    pub inclusive: bool,
}

/// A date window `[start, end)` (or `[start, end]` when the end is inclusive).
///
/// At least one bound is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub field: DateField,
    pub start: Option<NaiveDateTime>,
    pub end: Option<RangeEnd>,
}

// ---------------------------------------------------------------------------
// User, content, path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Creator,
    LastContributor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFilter {
    pub role: UserRole,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentTarget {
    FullText,
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentMatch {
    pub target: ContentTarget,
    pub op: Operator,
    pub value: String,
}

/// Folder restriction: `Equals` selects direct children, `StartsWith` the subtree.
/// NXQL cannot express direct children by path and renders both as a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFilter {
    pub op: Operator,
    pub path: String,
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// One field-level filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Predicate {
    Type(TypeFilter),
    State(StateFilter),
    #[serde(rename = "time")]
    Date(DateRange),
    User(UserFilter),
    Content(ContentMatch),
    Path(PathFilter),
}

impl Predicate {
    pub fn category(&self) -> Category {
        match self {
            Self::Type(_) => Category::Type,
            Self::State(_) => Category::State,
            Self::Date(_) => Category::Time,
            Self::User(_) => Category::User,
            Self::Content(_) => Category::Content,
            Self::Path(_) => Category::Path,
        }
    }

    /// Whether this is the injected generic type predicate.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Type(t) if t.doc_type.is_generic() && t.format.is_none())
    }
}

// ---------------------------------------------------------------------------
// Sort and limit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    Name,
    Created,
    Modified,
    Size,
    Path,
    Creator,
}

impl SortField {
    /// Map a spoken field name ("title", "date", "author", ...) to a sort field.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "title" | "titles" => Some(Self::Title),
            "name" | "names" | "filename" => Some(Self::Name),
            "created" | "creation" => Some(Self::Created),
            "modified" | "modification" | "updated" | "date" | "dates" => Some(Self::Modified),
            "size" => Some(Self::Size),
            "path" => Some(Self::Path),
            "author" | "creator" => Some(Self::Creator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: Direction,
}

/// Page size (always positive) and optional zero-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitSpec {
    pub page_size: u32,
    pub page_index: Option<u32>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Anything a resolver can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Predicate(Predicate),
    Sort(SortSpec),
    Limit(LimitSpec),
}

impl Resolved {
    pub fn category(&self) -> Category {
        match self {
            Self::Predicate(p) => p.category(),
            Self::Sort(_) => Category::Sort,
            Self::Limit(_) => Category::Limit,
        }
    }
}

/// Which index a query targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIndex {
    #[default]
    Repository,
    Audit,
}

impl FromStr for SearchIndex {
    type Err = NlqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "repository" | "repo" => Ok(Self::Repository),
            "audit" => Ok(Self::Audit),
            _ => Err(NlqError::UnknownIndex {
                name: s.to_string(),
            }),
        }
    }
}

/// One step of the derivation: which phrase produced which item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// The consumed text, with quoted literals restored in single quotes.
    pub phrase: String,
    pub category: Category,
    pub resolved: Resolved,
    pub span: Span,
    /// True when the entry comes from the full-text fallback rather than a cue.
    pub fallback: bool,
}

/// The complete output of one translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// Predicates in canonical category order; never empty.
    pub predicates: Vec<Predicate>,
    pub sort: Option<SortSpec>,
    pub limit: Option<LimitSpec>,
    /// Trace entries ordered by position in the input.
    pub trace: Vec<TraceEntry>,
    pub index: SearchIndex,
    /// True iff at least one non-default predicate came from a cue.
    pub matched_structure: bool,
}

impl ParseResult {
    /// The generic-type-only result used for empty input.
    pub fn empty() -> Self {
        Self {
            predicates: vec![Predicate::Type(TypeFilter::generic())],
            sort: None,
            limit: None,
            trace: Vec::new(),
            index: SearchIndex::Repository,
            matched_structure: false,
        }
    }

    /// The predicate for a category, if one survived composition.
    pub fn predicate(&self, category: Category) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.category() == category)
    }

    /// The resolved document type (the generic type when none was recognized).
    pub fn doc_type(&self) -> &DocType {
        self.predicates
            .iter()
            .find_map(|p| match p {
                Predicate::Type(t) => Some(&t.doc_type),
                _ => None,
            })
            .unwrap_or(&DocType::Document)
    }
}
