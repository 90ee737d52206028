//! Clause composition: run the resolvers, pick one winner per category,
//! inject defaults, and build the trace.

use std::collections::BTreeMap;

use super::normalize::{NormalizedInput, Span, Token};
use super::predicate::{
    Category, ContentMatch, ContentTarget, Operator, ParseResult, Predicate, Resolved, SearchIndex,
    StateFilter, TraceEntry, TypeFilter,
};
use super::resolve::{Hit, ResolveContext, Resolver};

/// Run every resolver in order over `input` and compose the result.
pub fn compose(
    input: &NormalizedInput,
    resolvers: &[Box<dyn Resolver>],
    ctx: &ResolveContext<'_>,
    fallback_fulltext: bool,
    index: SearchIndex,
) -> ParseResult {
    let mut claimed: Vec<Span> = Vec::new();
    let mut hits: Vec<Hit> = Vec::new();

    for resolver in resolvers {
        let found: Vec<Hit> = resolver
            .attempt(input, &claimed, ctx)
            .into_iter()
            .filter(|h| !h.span.overlaps_any(&claimed))
            .collect();
        tracing::debug!(category = %resolver.category(), hits = found.len(), "resolver pass");
        claimed.extend(found.iter().map(|h| h.span));
        hits.extend(found);
    }

    let mut winners: BTreeMap<Category, Hit> = BTreeMap::new();
    let mut state_hits: Vec<Hit> = Vec::new();
    for hit in hits {
        if hit.category == Category::State {
            state_hits.push(hit);
            continue;
        }
        match winners.get(&hit.category) {
            Some(current) if (current.priority, current.span.start) >= (hit.priority, hit.span.start) => {}
            _ => {
                winners.insert(hit.category, hit);
            }
        }
    }

    let mut trace: Vec<TraceEntry> = Vec::new();
    let mut predicates: BTreeMap<Category, Predicate> = BTreeMap::new();
    let mut sort = None;
    let mut limit = None;

    for hit in winners.into_values() {
        trace.push(entry(input, &hit, false));
        match hit.resolved {
            Resolved::Predicate(p) => {
                predicates.insert(p.category(), p);
            }
            Resolved::Sort(s) => sort = Some(s),
            Resolved::Limit(l) => limit = Some(l),
        }
    }

    state_hits.sort_by_key(|h| h.span);
    let mut state = StateFilter::default();
    for hit in &state_hits {
        if let Resolved::Predicate(Predicate::State(facet)) = &hit.resolved {
            state.merge(facet);
        }
        trace.push(entry(input, hit, false));
    }
    if !state.is_empty() {
        predicates.insert(Category::State, Predicate::State(state));
    }

    predicates
        .entry(Category::Type)
        .or_insert_with(|| Predicate::Type(TypeFilter::generic()));

    let matched_structure = predicates.values().any(|p| !p.is_default());

    if fallback_fulltext && !predicates.contains_key(&Category::Content) {
        if let Some((content, fallback_entry)) = fallback(input, &claimed, ctx, matched_structure) {
            tracing::info!(value = %content.value, "no content cue, falling back to full-text search");
            predicates.insert(Category::Content, Predicate::Content(content));
            trace.push(fallback_entry);
        }
    }

    trace.sort_by_key(|t| t.span.start);
    let predicates: Vec<Predicate> = predicates.into_values().collect();
    tracing::debug!(predicates = predicates.len(), matched_structure, "composed query");

    ParseResult {
        predicates,
        sort,
        limit,
        trace,
        index,
        matched_structure,
    }
}

fn entry(input: &NormalizedInput, hit: &Hit, fallback: bool) -> TraceEntry {
    TraceEntry {
        phrase: input.phrase(hit.span),
        category: hit.category,
        resolved: hit.resolved.clone(),
        span: hit.span,
        fallback,
    }
}

/// Build the full-text fallback from unclaimed input. Without any structure
/// every remaining meaningful word is searched; otherwise only leftover
/// quoted literals are.
fn fallback(
    input: &NormalizedInput,
    claimed: &[Span],
    ctx: &ResolveContext<'_>,
    matched_structure: bool,
) -> Option<(ContentMatch, TraceEntry)> {
    let leftover: Vec<&Token> = input
        .tokens
        .iter()
        .filter(|t| !t.span.overlaps_any(claimed))
        .filter(|t| {
            if matched_structure {
                t.is_literal()
            } else {
                t.is_literal() || !ctx.lexicon.is_boundary(&t.text)
            }
        })
        .collect();
    let (first, last) = (leftover.first()?, leftover.last()?);

    let mut words = Vec::with_capacity(leftover.len());
    let mut phrase = Vec::with_capacity(leftover.len());
    for token in &leftover {
        match token.literal.and_then(|i| input.literal(i)) {
            Some(literal) => {
                words.push(literal.to_string());
                phrase.push(format!("'{literal}'"));
            }
            None => {
                words.push(token.text.clone());
                phrase.push(token.text.clone());
            }
        }
    }
    let value = words.join(" ");
    if value.trim().is_empty() {
        return None;
    }

    let content = ContentMatch {
        target: ContentTarget::FullText,
        op: Operator::Contains,
        value,
    };
    let trace = TraceEntry {
        phrase: phrase.join(" "),
        category: Category::Content,
        resolved: Resolved::Predicate(Predicate::Content(content.clone())),
        span: Span::new(first.span.start, last.span.end),
        fallback: true,
    };
    Some((content, trace))
}
