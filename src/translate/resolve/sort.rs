//! Ordering cues: explicit `sorted by F [asc|desc]` and implicit modifiers
//! such as `latest`, `oldest`, `alphabetically`, `largest`.

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidates, Hit, ResolveContext, Resolver, span_of};
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{Category, Direction, Resolved, SortField, SortSpec};

static RE_EXPLICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:sorted|sort|order|ordered)\s+by\s+([a-z]+)(?:\s+(asc|desc|ascending|descending)\b)?",
    )
    .unwrap()
});

static RE_RECENCY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:latest|newest)\b").unwrap());

static MODIFIERS: LazyLock<Vec<(Regex, SortSpec)>> = LazyLock::new(|| {
    use Direction::{Ascending, Descending};
    [
        (r"latest|newest|most\s+recent", SortField::Modified, Descending),
        (r"oldest|earliest", SortField::Modified, Ascending),
        (r"alphabetical(?:ly)?", SortField::Title, Ascending),
        (r"by\s+name", SortField::Name, Ascending),
        (r"by\s+size|largest|biggest", SortField::Size, Descending),
        (r"smallest", SortField::Size, Ascending),
    ]
    .into_iter()
    .map(|(pattern, field, direction)| {
        (
            Regex::new(&format!(r"\b(?:{pattern})\b")).unwrap(),
            SortSpec { field, direction },
        )
    })
    .collect()
});

pub struct SortResolver;

impl Resolver for SortResolver {
    fn category(&self) -> Category {
        Category::Sort
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], _ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);
        let recency = RE_RECENCY
            .find_iter(&input.masked)
            .any(|m| !span_of(&m).overlaps_any(claimed));

        for caps in RE_EXPLICIT.captures_iter(&input.masked) {
            let (Some(whole), Some(field)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(field) = SortField::from_word(field.as_str()) else {
                tracing::debug!(field = field.as_str(), "ignoring unknown sort field");
                continue;
            };
            let direction = match caps.get(2).map(|m| m.as_str()) {
                Some("desc" | "descending") => Direction::Descending,
                Some(_) => Direction::Ascending,
                None if recency => Direction::Descending,
                None => Direction::Ascending,
            };
            candidates.offer(span_of(&whole), Resolved::Sort(SortSpec { field, direction }), 2);
        }

        for (regex, spec) in MODIFIERS.iter() {
            for m in regex.find_iter(&input.masked) {
                candidates.offer(span_of(&m), Resolved::Sort(*spec), 1);
            }
        }

        candidates.into_hits()
    }
}
