//! Title and full-text cues: `titled 'x'`, `title starts with 'x'`,
//! `containing 'x'`, `search for budget report`.

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidates, Hit, ResolveContext, Resolver, span_of};
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{
    Category, ContentMatch, ContentTarget, Operator, Predicate, Resolved,
};

/// Value slot: a literal placeholder or a single unquoted word.
const VALUE: &str = r"(\{\d+\}|[^\s{}]+)";

struct Pattern {
    regex: Regex,
    target: ContentTarget,
    op: Operator,
    priority: u8,
    /// Only a quoted literal is accepted as the value.
    quoted_only: bool,
}

fn pattern(cue: &str, target: ContentTarget, op: Operator, priority: u8, quoted_only: bool) -> Pattern {
    Pattern {
        regex: Regex::new(&format!(r"\b(?:{cue})\s+{VALUE}")).unwrap(),
        target,
        op,
        priority,
        quoted_only,
    }
}

static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    use ContentTarget::{FullText, Title};
    vec![
        pattern(r"(?:title|name)\s+starts?\s+with", Title, Operator::StartsWith, 3, false),
        pattern(
            r"(?:with\s+)?(?:the\s+)?title\s+(?:containing|contains?)|name\s+contains?",
            Title,
            Operator::Contains,
            3,
            false,
        ),
        pattern(r"with\s+(?:the\s+)?title", Title, Operator::Contains, 3, false),
        pattern(r"named|titled|called", Title, Operator::Equals, 3, false),
        pattern(
            r"containing|with\s+content|with\s+text|search\s+for|about",
            FullText,
            Operator::Contains,
            2,
            true,
        ),
    ]
});

/// Cues that accept an unquoted multi-word full-text value.
static RE_FREE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:containing|with\s+content|with\s+text|search\s+for)\b").unwrap()
});

pub struct ContentResolver;

impl Resolver for ContentResolver {
    fn category(&self) -> Category {
        Category::Content
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);

        for p in PATTERNS.iter() {
            for caps in p.regex.captures_iter(&input.masked) {
                let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let value = match input.placeholder_literal(value.as_str()) {
                    Some(literal) if literal.trim().is_empty() => continue,
                    Some(literal) => literal.to_string(),
                    None if p.quoted_only => continue,
                    None if ctx.lexicon.is_boundary(value.as_str()) => continue,
                    None => value.as_str().to_string(),
                };
                candidates.offer(span_of(&whole), content(p.target, p.op, value), p.priority);
            }
        }

        for cue in RE_FREE_TEXT.find_iter(&input.masked) {
            let Some(first) = input.token_at_or_after(cue.end()) else {
                continue;
            };
            let words: Vec<_> = input.tokens[first..]
                .iter()
                .take_while(|t| !t.is_literal() && !ctx.lexicon.is_keyword(&t.text))
                .collect();
            let Some(last) = words.last() else {
                continue;
            };
            let value = words.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
            let span = Span::new(cue.start(), last.span.end);
            candidates.offer(span, content(ContentTarget::FullText, Operator::Contains, value), 1);
        }

        candidates.into_hits()
    }
}

fn content(target: ContentTarget, op: Operator, value: String) -> Resolved {
    Resolved::Predicate(Predicate::Content(ContentMatch { target, op, value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::resolve::test_support::run;

    fn single(text: &str) -> ContentMatch {
        let (_, hits) = run(&ContentResolver, text);
        assert_eq!(hits.len(), 1, "hits for {text:?}: {hits:?}");
        match &hits[0].resolved {
            Resolved::Predicate(Predicate::Content(m)) => m.clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quoted_fulltext_keeps_case() {
        let m = single(r#"documents containing "Quarterly Budget""#);
        assert_eq!(m.target, ContentTarget::FullText);
        assert_eq!(m.op, Operator::Contains);
        assert_eq!(m.value, "Quarterly Budget");
    }

    #[test]
    fn title_starts_with() {
        let m = single("notes with title starts with 'Q3'");
        assert_eq!(m.target, ContentTarget::Title);
        assert_eq!(m.op, Operator::StartsWith);
        assert_eq!(m.value, "Q3");
    }

    #[test]
    fn title_containing() {
        let m = single("files with title containing 'report'");
        assert_eq!((m.target, m.op), (ContentTarget::Title, Operator::Contains));
        assert_eq!(m.value, "report");
    }

    #[test]
    fn with_title_is_contains() {
        let m = single("notes with title 'Roadmap'");
        assert_eq!((m.target, m.op), (ContentTarget::Title, Operator::Contains));
    }

    #[test]
    fn named_is_equals() {
        let m = single("the folder named 'Contracts'");
        assert_eq!((m.target, m.op), (ContentTarget::Title, Operator::Equals));
        assert_eq!(m.value, "Contracts");
        let m = single("a note titled roadmap");
        assert_eq!(m.value, "roadmap");
    }

    #[test]
    fn unquoted_fulltext_stops_at_keyword() {
        let m = single("search for budget report created by john");
        assert_eq!(m.target, ContentTarget::FullText);
        assert_eq!(m.value, "budget report");
    }

    #[test]
    fn cue_followed_by_keyword_yields_nothing() {
        let (_, hits) = run(&ContentResolver, "search for invoices");
        assert!(hits.is_empty());
        let (_, hits) = run(&ContentResolver, "notes titled by john");
        assert!(hits.is_empty());
    }

    #[test]
    fn blank_literal_is_not_a_value() {
        let (_, hits) = run(&ContentResolver, "notes containing '   '");
        assert!(hits.is_empty());
        let (_, hits) = run(&ContentResolver, "files with title '  '");
        assert!(hits.is_empty());
    }

    #[test]
    fn about_requires_quotes() {
        let (_, hits) = run(&ContentResolver, "documents about budgets");
        assert!(hits.is_empty());
        let m = single("documents about 'budgets'");
        assert_eq!(m.value, "budgets");
    }

    #[test]
    fn cue_words_inside_literal_are_inert() {
        let (_, hits) = run(&ContentResolver, "notes 'titled x'");
        assert!(hits.is_empty());
    }
}
