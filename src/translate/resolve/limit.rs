//! Result-count cues: `limit 10`, `top 5`, `first 3`, `show me 20`,
//! `10 results`, `5 latest`, `page 2`.

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidates, Hit, ResolveContext, Resolver, span_of};
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{Category, LimitSpec, Resolved};

static RE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:limit(?:\s+to)?|top|first|show\s+(?:me\s+)?)\s*(\d+)\b").unwrap());

static RE_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bpage\s+(\d+)\b").unwrap());

/// Nouns consumed together with a leading count.
const COUNT_NOUNS: &[&str] = &["result", "results", "item", "items"];

/// Words after which only the count itself is consumed, leaving the word to
/// the sort or type resolvers.
const RECENCY_WORDS: &[&str] = &["recent", "latest", "newest", "oldest"];

pub struct LimitResolver;

impl Resolver for LimitResolver {
    fn category(&self) -> Category {
        Category::Limit
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut sizes: Vec<(Span, u32)> = Vec::new();
        let mut pages: Vec<(Span, u32)> = Vec::new();
        let mut candidates = Candidates::new(input, claimed);

        for caps in RE_COUNT.captures_iter(&input.masked) {
            let (Some(whole), Some(n)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(n) = count(n.as_str(), ctx) {
                sizes.push((span_of(&whole), n));
            }
        }

        for pair in input.tokens.windows(2) {
            let (number, next) = (&pair[0], &pair[1]);
            if number.is_literal() || !number.text.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            let span = if COUNT_NOUNS.contains(&next.text.as_str()) {
                Span::new(number.span.start, next.span.end)
            } else if RECENCY_WORDS.contains(&next.text.as_str())
                || ctx.lexicon.match_type(&next.text).is_some()
            {
                number.span
            } else {
                continue;
            };
            if let Some(n) = count(&number.text, ctx) {
                sizes.push((span, n));
            }
        }

        for caps in RE_PAGE.captures_iter(&input.masked) {
            let (Some(whole), Some(n)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(n) = n.as_str().parse::<u32>().ok().filter(|&n| n > 0) {
                pages.push((span_of(&whole), n - 1));
            }
        }

        // Drop overlapping and claimed spans first, then fold everything that
        // survives into a single effective limit.
        sizes.retain(|(span, _)| candidates.is_free(*span));
        sizes.sort_by_key(|(span, _)| *span);
        sizes.dedup_by(|b, a| a.0.overlaps(&b.0));
        pages.retain(|(span, _)| candidates.is_free(*span) && !sizes.iter().any(|(s, _)| s.overlaps(span)));

        let page_size = sizes.last().map(|(_, n)| *n).unwrap_or(ctx.default_page_size);
        let page_index = pages.last().map(|(_, i)| *i);
        let spec = LimitSpec {
            page_size,
            page_index,
        };

        for (span, _) in sizes.iter().chain(pages.iter()) {
            candidates.offer(*span, Resolved::Limit(spec), 1);
        }
        candidates.into_hits()
    }
}

/// Parse a requested count; zero is ignored, oversized values are clamped.
fn count(digits: &str, ctx: &ResolveContext<'_>) -> Option<u32> {
    let n = match digits.parse::<u64>() {
        Ok(0) => return None,
        Ok(n) => n,
        Err(_) => u64::MAX,
    };
    let max = u64::from(ctx.max_page_size);
    if n > max {
        tracing::warn!(requested = digits, max, "clamping result limit");
        return Some(ctx.max_page_size);
    }
    u32::try_from(n).ok()
}
