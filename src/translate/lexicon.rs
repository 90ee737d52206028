//! Immutable vocabulary tables: document-type synonyms, cue keywords, filler words.
//!
//! The `Lexicon` is built once per [`Translator`](super::Translator) and shared
//! by reference with every resolver.

use std::collections::{BTreeMap, BTreeSet};

use super::predicate::{DocType, TypeFilter};

/// Words that introduce or terminate a cue. A user name or unquoted
/// full-text value stops at the first of these.
const KEYWORDS: &[&str] = &[
    // user cues
    "by", "from", "created", "modified", "updated", "changed", "edited", "authored",
    "written", "user", "my", "mine",
    // sort and limit
    "sorted", "sort", "order", "ordered", "limit", "top", "first", "page", "asc", "desc",
    "ascending", "descending", "alphabetical", "alphabetically", "largest", "smallest",
    "latest", "newest", "oldest", "earliest", "most", "recent", "results", "result",
    "items", "item",
    // path
    "in", "within", "under", "path", "folder",
    // time
    "since", "after", "before", "between", "today", "yesterday", "this", "last", "past",
    "day", "days", "week", "weeks", "month", "months", "year", "years",
    // content
    "with", "containing", "contains", "contain", "content", "text", "title", "named",
    "titled", "called", "about", "search", "starts", "start",
    // state
    "draft", "drafts", "published", "archived", "locked", "deleted", "trashed", "trash", "active",
    "version", "versions", "proxy", "proxies", "checked", "not", "no",
    // conjunctions
    "and", "or",
];

/// Words that carry no search meaning and are skipped by the full-text fallback.
const FILLERS: &[&str] = &[
    "find", "search", "get", "show", "list", "me", "all", "the", "a", "an", "of", "for",
    "please", "any", "some", "give", "display", "fetch", "look", "i", "want", "need", "to",
    "with", "that", "are", "is", "which", "where", "can", "you", "documents", "document",
    "docs", "doc", "and", "or", "in", "on", "at",
];

/// Built-in type synonyms: word, type, optional mime format.
const TYPE_WORDS: &[(&str, DocType, Option<&str>)] = &[
    ("invoice", DocType::Invoice, None),
    ("invoices", DocType::Invoice, None),
    ("file", DocType::File, None),
    ("files", DocType::File, None),
    ("folder", DocType::Folder, None),
    ("folders", DocType::Folder, None),
    ("directory", DocType::Folder, None),
    ("directories", DocType::Folder, None),
    ("note", DocType::Note, None),
    ("notes", DocType::Note, None),
    ("workspace", DocType::Workspace, None),
    ("workspaces", DocType::Workspace, None),
    ("pdf", DocType::File, Some("application/pdf")),
    ("pdfs", DocType::File, Some("application/pdf")),
    ("image", DocType::Picture, None),
    ("images", DocType::Picture, None),
    ("picture", DocType::Picture, None),
    ("pictures", DocType::Picture, None),
    ("photo", DocType::Picture, None),
    ("photos", DocType::Picture, None),
    ("video", DocType::Video, None),
    ("videos", DocType::Video, None),
    ("audio", DocType::Audio, None),
    ("audios", DocType::Audio, None),
    ("document", DocType::Document, None),
    ("documents", DocType::Document, None),
    ("doc", DocType::Document, None),
    ("docs", DocType::Document, None),
];

/// Minimum word length for fuzzy type matching.
const FUZZY_MIN_LEN: usize = 5;

/// How a word matched the type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMatch<'a> {
    Exact(&'a TypeFilter),
    Fuzzy(&'a TypeFilter),
}

impl<'a> TypeMatch<'a> {
    pub fn filter(&self) -> &'a TypeFilter {
        match self {
            Self::Exact(f) | Self::Fuzzy(f) => f,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    types: BTreeMap<String, TypeFilter>,
    keywords: BTreeSet<String>,
    fillers: BTreeSet<String>,
}

impl Lexicon {
    /// The built-in English vocabulary.
    pub fn default_english() -> Self {
        let types = TYPE_WORDS
            .iter()
            .map(|(word, doc_type, format)| {
                (
                    (*word).to_string(),
                    TypeFilter {
                        doc_type: doc_type.clone(),
                        format: format.map(str::to_string),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        let mut keywords: BTreeSet<String> = KEYWORDS.iter().map(|w| (*w).to_string()).collect();
        keywords.extend(types.keys().cloned());
        let fillers = FILLERS.iter().map(|w| (*w).to_string()).collect();

        Self {
            types,
            keywords,
            fillers,
        }
    }

    /// Add configured `word → type name` synonyms. Configured words override
    /// built-in ones.
    pub fn with_synonyms<'s>(mut self, synonyms: impl IntoIterator<Item = (&'s String, &'s String)>) -> Self {
        for (word, type_name) in synonyms {
            let word = word.to_lowercase();
            self.keywords.insert(word.clone());
            self.types.insert(
                word,
                TypeFilter {
                    doc_type: DocType::from_name(type_name),
                    format: None,
                },
            );
        }
        self
    }

    /// Look up a word in the type table, exactly first, then by stem.
    ///
    /// A stem match needs both stems (trailing plural `s` removed) to be at
    /// least five letters, to agree on their first and last letters, and to
    /// be within Levenshtein distance 1. Stems where one is a prefix of the
    /// other are inflections (`filed`, `noted`), not typos, and never match.
    pub fn match_type(&self, word: &str) -> Option<TypeMatch<'_>> {
        if let Some(filter) = self.types.get(word) {
            return Some(TypeMatch::Exact(filter));
        }
        if self.keywords.contains(word)
            || self.fillers.contains(word)
            || !word.chars().all(char::is_alphabetic)
        {
            return None;
        }
        let stem = stem(word);
        if stem.chars().count() < FUZZY_MIN_LEN {
            return None;
        }
        self.types
            .iter()
            .find(|(candidate, _)| is_typo_of(stem, self::stem(candidate)))
            .map(|(_, filter)| TypeMatch::Fuzzy(filter))
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn is_filler(&self, word: &str) -> bool {
        self.fillers.contains(word)
    }

    /// Keyword or filler: a word that ends a name or free-text value.
    pub fn is_boundary(&self, word: &str) -> bool {
        self.is_keyword(word) || self.is_filler(word)
    }

    /// All type words with the type they select, in alphabetical order.
    pub fn type_words(&self) -> impl Iterator<Item = (&str, &TypeFilter)> {
        self.types.iter().map(|(w, f)| (w.as_str(), f))
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn fillers(&self) -> impl Iterator<Item = &str> {
        self.fillers.iter().map(String::as_str)
    }
}

/// Drop one trailing plural `s` (but not the `ss` of `class`).
fn stem(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(rest) if !rest.is_empty() && !rest.ends_with('s') => rest,
        _ => word,
    }
}

fn is_typo_of(stem: &str, candidate: &str) -> bool {
    if candidate.chars().count() < FUZZY_MIN_LEN {
        return false;
    }
    if stem != candidate && (stem.starts_with(candidate) || candidate.starts_with(stem)) {
        return false;
    }
    stem.chars().next() == candidate.chars().next()
        && stem.chars().last() == candidate.chars().last()
        && strsim::levenshtein(stem, candidate) <= 1
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::default_english()
    }
}
