//! Input normalization: lowercasing, punctuation stripping, quote extraction.
//!
//! Produces a [`NormalizedInput`] whose `masked` text is what resolvers match
//! against. Every quoted literal is replaced in `masked` by a `{i}` placeholder
//! so cue patterns can never fire inside user-supplied values, while `text`
//! carries the same content with the literals restored verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

/// Matches a literal placeholder in masked text.
pub static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").unwrap());

/// Byte range `[start, end)` into the masked text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn overlaps_any(&self, spans: &[Span]) -> bool {
        spans.iter().any(|s| self.overlaps(s))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A word of the masked text, or a reference to a quoted literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Span,
    /// Index into [`NormalizedInput::literals`] when this token is a placeholder.
    pub literal: Option<usize>,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    pub original: String,
    /// Lowercased, punctuation-stripped text with literals restored verbatim.
    pub text: String,
    /// Quoted strings in order of appearance, case preserved.
    pub literals: Vec<String>,
    /// `text` with each literal replaced by `{i}`.
    pub masked: String,
    pub tokens: Vec<Token>,
}

impl NormalizedInput {
    /// Normalize raw user text. Never fails.
    pub fn new(original: &str) -> Self {
        let mut out = Builder::default();
        let chars: Vec<char> = original.chars().collect();
        let n = chars.len();
        let mut i = 0;

        while i < n {
            let c = chars[i];
            let prev_alnum = i > 0 && chars[i - 1].is_alphanumeric();
            let next_alnum = i + 1 < n && chars[i + 1].is_alphanumeric();

            if (c == '"' || c == '\'') && !prev_alnum {
                let close = (i + 1..n).find(|&j| {
                    chars[j] == c && (j + 1 == n || !chars[j + 1].is_alphanumeric())
                });
                let end = close.unwrap_or(n);
                let content: String = chars[i + 1..end].iter().collect();
                out.literal(content);
                i = close.map_or(n, |j| j + 1);
                continue;
            }

            if c.is_alphanumeric() {
                for lower in c.to_lowercase() {
                    out.push(lower);
                }
            } else if c.is_whitespace() {
                out.space();
            } else if matches!(c, '-' | '/' | '_') {
                out.push(c);
            } else if matches!(c, '.' | ':' | '\'') && prev_alnum && next_alnum {
                out.push(c);
            } else {
                out.space();
            }
            i += 1;
        }

        let tokens = tokenize(&out.masked);
        Self {
            original: original.to_string(),
            text: out.text,
            literals: out.literals,
            masked: out.masked,
            tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn literal(&self, index: usize) -> Option<&str> {
        self.literals.get(index).map(String::as_str)
    }

    /// Resolve a `{i}` placeholder string to its literal.
    pub fn placeholder_literal(&self, placeholder: &str) -> Option<&str> {
        let caps = PLACEHOLDER.captures(placeholder)?;
        if caps.get(0)?.as_str().len() != placeholder.len() {
            return None;
        }
        let index: usize = caps[1].parse().ok()?;
        self.literal(index)
    }

    /// Substitute every placeholder in `masked` with its literal.
    pub fn reconstruct(&self) -> String {
        self.substitute(&self.masked, |lit| lit.to_string())
    }

    /// The consumed text of `span`, with literals shown in single quotes.
    pub fn phrase(&self, span: Span) -> String {
        let slice = self.masked.get(span.start..span.end).unwrap_or_default();
        self.substitute(slice, |lit| format!("'{lit}'"))
    }

    /// Tokens whose span lies entirely inside `span`.
    pub fn tokens_in(&self, span: Span) -> impl Iterator<Item = &Token> {
        self.tokens
            .iter()
            .filter(move |t| t.span.start >= span.start && t.span.end <= span.end)
    }

    /// Index of the first token starting at or after `offset`.
    pub fn token_at_or_after(&self, offset: usize) -> Option<usize> {
        self.tokens.iter().position(|t| t.span.start >= offset)
    }

    /// Index of the last token ending at or before `offset`.
    pub fn token_before(&self, offset: usize) -> Option<usize> {
        self.tokens.iter().rposition(|t| t.span.end <= offset)
    }

    fn substitute(&self, masked: &str, render: impl Fn(&str) -> String) -> String {
        PLACEHOLDER
            .replace_all(masked, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.literal(i))
                    .map(&render)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Accumulates `masked` and `text` in lockstep.
#[derive(Default)]
struct Builder {
    masked: String,
    text: String,
    literals: Vec<String>,
    pending_space: bool,
}

impl Builder {
    fn separate(&mut self) {
        if self.pending_space && !self.masked.is_empty() {
            self.masked.push(' ');
            self.text.push(' ');
        }
        self.pending_space = false;
    }

    fn push(&mut self, c: char) {
        self.separate();
        self.masked.push(c);
        self.text.push(c);
    }

    fn space(&mut self) {
        self.pending_space = true;
    }

    fn literal(&mut self, content: String) {
        if content.is_empty() {
            self.space();
            return;
        }
        self.pending_space = true;
        self.separate();
        let index = self.literals.len();
        self.masked.push_str(&format!("{{{index}}}"));
        self.text.push_str(&content);
        self.literals.push(content);
        self.pending_space = true;
    }
}

fn tokenize(masked: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    for word in masked.split(' ') {
        if !word.is_empty() {
            let span = Span::new(offset, offset + word.len());
            let literal = PLACEHOLDER
                .captures(word)
                .filter(|c| c.get(0).is_some_and(|m| m.len() == word.len()))
                .and_then(|c| c[1].parse().ok());
            tokens.push(Token {
                text: word.to_string(),
                span,
                literal,
            });
        }
        offset += word.len() + 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let n = NormalizedInput::new("  Find ALL invoices!!  ");
        assert_eq!(n.text, "find all invoices");
        assert_eq!(n.masked, "find all invoices");
        assert_eq!(n.tokens.len(), 3);
    }

    #[test]
    fn keeps_path_and_date_punctuation() {
        let n = NormalizedInput::new("files under /Projects/Q1_2024 since 2024-01-05");
        assert_eq!(n.text, "files under /projects/q1_2024 since 2024-01-05");
    }

    #[test]
    fn dots_and_colons_only_between_alphanumerics() {
        let n = NormalizedInput::new("report v1.2: final.");
        assert_eq!(n.text, "report v1.2 final");
    }

    #[test]
    fn extracts_quoted_literals_verbatim() {
        let n = NormalizedInput::new(r#"Documents containing "Quarterly Budget" by 'Jane'"#);
        assert_eq!(n.literals, vec!["Quarterly Budget", "Jane"]);
        assert_eq!(n.masked, "documents containing {0} by {1}");
        assert_eq!(n.text, "documents containing Quarterly Budget by Jane");
        assert_eq!(n.reconstruct(), n.text);
        assert_eq!(n.tokens[2].literal, Some(0));
        assert_eq!(n.tokens[4].literal, Some(1));
    }

    #[test]
    fn possessive_is_not_a_quote() {
        let n = NormalizedInput::new("John's invoices");
        assert!(n.literals.is_empty());
        assert_eq!(n.text, "john's invoices");
    }

    #[test]
    fn apostrophe_inside_quoted_literal() {
        let n = NormalizedInput::new(r#"titled "Bob's Notes" please"#);
        assert_eq!(n.literals, vec!["Bob's Notes"]);
        assert_eq!(n.masked, "titled {0} please");
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let n = NormalizedInput::new("search for 'annual Report");
        assert_eq!(n.literals, vec!["annual Report"]);
        assert_eq!(n.masked, "search for {0}");
    }

    #[test]
    fn empty_quotes_are_dropped() {
        let n = NormalizedInput::new("notes named ''");
        assert!(n.literals.is_empty());
        assert_eq!(n.text, "notes named");
    }

    #[test]
    fn braces_outside_quotes_never_look_like_placeholders() {
        let n = NormalizedInput::new("notes {0} here");
        assert!(n.literals.is_empty());
        assert!(n.tokens.iter().all(|t| t.literal.is_none()));
        assert_eq!(n.text, "notes 0 here");
    }

    #[test]
    fn phrase_shows_literals_quoted() {
        let n = NormalizedInput::new("title contains 'Q3 plan'");
        let span = Span::new(0, n.masked.len());
        assert_eq!(n.phrase(span), "title contains 'Q3 plan'");
    }

    #[test]
    fn empty_and_punctuation_only_input() {
        assert!(NormalizedInput::new("").is_empty());
        assert!(NormalizedInput::new(" ?!, ").is_empty());
    }

    #[test]
    fn token_spans_index_masked_text() {
        let n = NormalizedInput::new("latest 'x' files");
        for t in &n.tokens {
            assert_eq!(&n.masked[t.span.start..t.span.end], t.text);
        }
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(0, 5);
        assert!(a.overlaps(&Span::new(4, 8)));
        assert!(!a.overlaps(&Span::new(5, 8)));
        assert!(a.overlaps_any(&[Span::new(10, 12), Span::new(2, 3)]));
    }
}
