//! Target index detection: audit-trail questions versus repository searches.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::NormalizedInput;
use super::predicate::SearchIndex;

static RE_AUDIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:audit|logs?|events?|activity|activities|deletions?|modifications?|who\s+(?:deleted|modified|created|updated)|what\s+did)\b",
    )
    .unwrap()
});

/// Pick the index a request targets. Quoted literals never count.
pub fn detect_index(input: &NormalizedInput) -> SearchIndex {
    if RE_AUDIT.is_match(&input.masked) {
        SearchIndex::Audit
    } else {
        SearchIndex::Repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(text: &str) -> SearchIndex {
        detect_index(&NormalizedInput::new(text))
    }

    #[test]
    fn audit_vocabulary() {
        assert_eq!(index("audit log for invoices"), SearchIndex::Audit);
        assert_eq!(index("who deleted the contract"), SearchIndex::Audit);
        assert_eq!(index("recent activity by john"), SearchIndex::Audit);
        assert_eq!(index("what did alice change"), SearchIndex::Audit);
    }

    #[test]
    fn repository_by_default() {
        assert_eq!(index("draft invoices"), SearchIndex::Repository);
        assert_eq!(index("notes titled 'event plan'"), SearchIndex::Repository);
        assert_eq!(index("catalogs"), SearchIndex::Repository);
    }
}
