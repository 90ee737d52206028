//! Folder cues: `in folder P` (direct children) and `under P`, `in path P`,
//! `within P`, `from /p` (subtree).

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidates, Hit, ResolveContext, Resolver, span_of};
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{Category, Operator, PathFilter, Predicate, Resolved};

static RE_IN_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\s+(?:the\s+)?folder\s+(\{\d+\}|/[^\s{}]*)").unwrap()
});

static RE_SUBTREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:under|in\s+path|within|in)\s+(?:the\s+)?(\{\d+\}|/[^\s{}]*)").unwrap()
});

/// `from` only introduces a path when the path is unquoted and rooted;
/// `from 'x'` is a user cue.
static RE_FROM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfrom\s+(/[^\s{}]*)").unwrap());

pub struct PathResolver;

impl Resolver for PathResolver {
    fn category(&self) -> Category {
        Category::Path
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], _ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);
        let patterns: [(&Regex, Operator); 3] = [
            (&*RE_IN_FOLDER, Operator::Equals),
            (&*RE_SUBTREE, Operator::StartsWith),
            (&*RE_FROM, Operator::StartsWith),
        ];

        for (regex, op) in patterns {
            for caps in regex.captures_iter(&input.masked) {
                let (Some(whole), Some(raw)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let raw = input.placeholder_literal(raw.as_str()).unwrap_or(raw.as_str());
                let Some(path) = normalize_path(raw) else {
                    continue;
                };
                let resolved = Resolved::Predicate(Predicate::Path(PathFilter { op, path }));
                candidates.offer(span_of(&whole), resolved, 1);
            }
        }

        candidates.into_hits()
    }
}

/// Make a path absolute and strip trailing slashes. The root stays `/`.
pub fn normalize_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let body = trimmed.trim_end_matches('/');
    if body.is_empty() {
        return Some("/".into());
    }
    Some(if body.starts_with('/') {
        body.to_string()
    } else {
        format!("/{body}")
    })
}
