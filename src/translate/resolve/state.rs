//! Lifecycle and system-flag cues: drafts, trash, versions, proxies, check-in.
//!
//! Every cue yields its own hit carrying only the facet it sets; the composer
//! folds them into one [`StateFilter`].

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidates, Hit, ResolveContext, Resolver, span_of};
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{
    Category, Lifecycle, Predicate, Resolved, StateFilter, VersionFacet,
};

struct Cue {
    regex: Regex,
    facet: StateFilter,
}

fn cue(pattern: &str, facet: StateFilter) -> Cue {
    Cue {
        regex: Regex::new(&format!(r"\b(?:{pattern})\b")).unwrap(),
        facet,
    }
}

fn trashed(flag: bool) -> StateFilter {
    StateFilter {
        trashed: Some(flag),
        ..Default::default()
    }
}

fn lifecycle(state: Lifecycle) -> StateFilter {
    StateFilter {
        lifecycle: Some(state),
        ..Default::default()
    }
}

fn version(facet: VersionFacet) -> StateFilter {
    StateFilter {
        version: Some(facet),
        ..Default::default()
    }
}

/// Negated forms come before the positive words they contain.
static CUES: LazyLock<Vec<Cue>> = LazyLock::new(|| {
    vec![
        cue(r"not\s+in\s+(?:the\s+)?trash|not\s+deleted|not\s+trashed|non-deleted", trashed(false)),
        cue(r"in\s+(?:the\s+)?trash|deleted|trashed", trashed(true)),
        cue(
            "active",
            StateFilter {
                trashed: Some(false),
                active: true,
                ..Default::default()
            },
        ),
        cue(r"drafts?", lifecycle(Lifecycle::Draft)),
        cue("published", lifecycle(Lifecycle::Published)),
        cue("archived", lifecycle(Lifecycle::Archived)),
        cue("locked", lifecycle(Lifecycle::Locked)),
        cue(r"latest\s+versions?", version(VersionFacet::Latest)),
        cue(r"(?:not|no)\s+versions?", version(VersionFacet::NotVersion)),
        cue(r"versions?", version(VersionFacet::Version)),
        cue(
            r"(?:not|no)\s+prox(?:y|ies)",
            StateFilter {
                proxy: Some(false),
                ..Default::default()
            },
        ),
        cue(
            r"prox(?:y|ies)",
            StateFilter {
                proxy: Some(true),
                ..Default::default()
            },
        ),
        cue(
            r"checked\s+in",
            StateFilter {
                checked_in: Some(true),
                ..Default::default()
            },
        ),
        cue(
            r"checked\s+out",
            StateFilter {
                checked_in: Some(false),
                ..Default::default()
            },
        ),
    ]
});

pub struct StateResolver;

impl Resolver for StateResolver {
    fn category(&self) -> Category {
        Category::State
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], _ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);
        for cue in CUES.iter() {
            for m in cue.regex.find_iter(&input.masked) {
                let resolved = Resolved::Predicate(Predicate::State(cue.facet.clone()));
                candidates.offer(span_of(&m), resolved, 1);
            }
        }
        candidates.into_hits()
    }
}
