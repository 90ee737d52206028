//! Author cues: `created by john`, `modified by 'Jane Doe'`, `by alice`,
//! `from bob`, `bob's`, and `my`/`mine` when the caller is known.

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidates, Hit, ResolveContext, Resolver};
use crate::translate::normalize::{NormalizedInput, Span, Token};
use crate::translate::predicate::{Category, Predicate, Resolved, UserFilter, UserRole};

static RE_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?P<contributor>modified|updated|changed|edited)\s+by|(?:created|authored|written)\s+by(?:\s+user)?|by\s+user|(?P<bare>by|from))\b",
    )
    .unwrap()
});

/// Unquoted names are at most this many words.
const MAX_NAME_WORDS: usize = 3;

/// Words that take `'s` without naming a person.
const POSSESSIVE_STOP: &[&str] = &["it", "that", "what", "who", "there", "here", "let", "today", "this"];

const SORT_VERBS: &[&str] = &["sorted", "sort", "order", "ordered"];

pub struct UserResolver;

impl Resolver for UserResolver {
    fn category(&self) -> Category {
        Category::User
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);

        for caps in RE_CUE.captures_iter(&input.masked) {
            let Some(cue) = caps.get(0) else {
                continue;
            };
            if caps.name("bare").is_some() && follows_sort_verb(input, cue.start()) {
                continue;
            }
            let role = if caps.name("contributor").is_some() {
                UserRole::LastContributor
            } else {
                UserRole::Creator
            };
            let Some(first) = input.token_at_or_after(cue.end()) else {
                continue;
            };
            let Some((name, end)) = take_name(input, &input.tokens[first..], ctx) else {
                continue;
            };
            candidates.offer(Span::new(cue.start(), end), user(role, name), 1);
        }

        for token in &input.tokens {
            if let Some(stem) = possessive(&token.text) {
                if !ctx.lexicon.is_boundary(stem) && !POSSESSIVE_STOP.contains(&stem) {
                    candidates.offer(token.span, user(UserRole::Creator, stem.to_string()), 1);
                }
            }
            if let (Some(caller), "my" | "mine") = (ctx.caller, token.text.as_str()) {
                candidates.offer(token.span, user(UserRole::Creator, caller.to_string()), 1);
            }
        }

        candidates.into_hits()
    }
}

fn user(role: UserRole, name: String) -> Resolved {
    Resolved::Predicate(Predicate::User(UserFilter { role, name }))
}

fn follows_sort_verb(input: &NormalizedInput, offset: usize) -> bool {
    input
        .token_before(offset)
        .is_some_and(|i| SORT_VERBS.contains(&input.tokens[i].text.as_str()))
}

/// The name after a cue and the end offset of its last token.
fn take_name(input: &NormalizedInput, tokens: &[Token], ctx: &ResolveContext<'_>) -> Option<(String, usize)> {
    let head = tokens.first()?;
    if let Some(index) = head.literal {
        let literal = input.literal(index)?.trim();
        return (!literal.is_empty()).then(|| (literal.to_string(), head.span.end));
    }
    if head.text.starts_with('/') || head.text.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let words: Vec<&Token> = tokens
        .iter()
        .take(MAX_NAME_WORDS)
        .take_while(|t| !t.is_literal() && !ctx.lexicon.is_boundary(&t.text) && possessive(&t.text).is_none())
        .collect();
    let last = words.last()?;
    let name = words.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
    Some((name, last.span.end))
}

fn possessive(word: &str) -> Option<&str> {
    word.strip_suffix("'s").filter(|stem| {
        !stem.is_empty()
            && stem
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    })
}
