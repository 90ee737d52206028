//! Property-based tests for the translator using proptest.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use nxql_translate::config::{Dialect, TranslatorConfig};
use nxql_translate::translate::{
    Category, NormalizedInput, Predicate, TranslateRequest, Translator,
};

// ============================================================================
// Test helpers
// ============================================================================

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 12)
        .unwrap()
        .and_hms_opt(15, 30, 0)
        .unwrap()
}

/// Sentences built from real cue words, so resolvers actually fire.
fn sentence_strategy() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "invoices", "notes", "draft", "published", "deleted", "not", "in", "trash", "by", "john",
        "created", "modified", "from", "last", "this", "week", "month", "sorted", "title",
        "date", "limit", "10", "top", "5", "latest", "oldest", "under", "/projects", "folder",
        "containing", "'Budget 2024'", "\"x' OR 1=1\"", "page", "2", "my", "bob's", "today",
        "since", "2024-01-05", "pdfs", "alphabetically", "audit", "the", "all",
    ]);
    prop::collection::vec(words, 0..12).prop_map(|w| w.join(" "))
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Any input renders a query with at least one clause, in both dialects.
    #[test]
    fn never_empty(text in "\\PC{0,80}") {
        let t = Translator::new(TranslatorConfig::default());
        let result = t.translate(&text, now());
        prop_assert!(!result.predicates.is_empty());

        let out = t.run(&TranslateRequest::new(text.clone(), now()));
        prop_assert!(out.query.starts_with("SELECT * FROM Document WHERE "));
        prop_assert!(out.query.len() > "SELECT * FROM Document WHERE ".len());

        let es = t.run(&TranslateRequest::new(text, now()).dialect(Dialect::Elasticsearch));
        let body: serde_json::Value = serde_json::from_str(&es.query).unwrap();
        prop_assert!(body.get("query").is_some());
    }

    /// Same input, same output.
    #[test]
    fn deterministic(text in sentence_strategy()) {
        let a = Translator::new(TranslatorConfig::default());
        let b = Translator::new(TranslatorConfig::default());
        let first = a.run(&TranslateRequest::new(text.clone(), now()).explain(true));
        let second = b.run(&TranslateRequest::new(text, now()).explain(true));
        prop_assert_eq!(first, second);
    }

    /// At most one predicate per category, in canonical order.
    #[test]
    fn one_predicate_per_category(text in sentence_strategy()) {
        let t = Translator::new(TranslatorConfig::default());
        let result = t.translate(&text, now());
        let categories: Vec<Category> = result.predicates.iter().map(Predicate::category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(categories, sorted);
    }

    /// A quoted literal after a content cue reaches the query value unchanged.
    #[test]
    fn quoted_literal_round_trip(value in "[A-Za-z0-9][A-Za-z0-9 ]{0,20}[A-Za-z0-9]") {
        let t = Translator::new(TranslatorConfig::default());
        let text = format!("notes containing \"{value}\"");
        let result = t.translate(&text, now());
        let content = result.predicates.iter().find_map(|p| match p {
            Predicate::Content(c) => Some(c.value.clone()),
            _ => None,
        });
        prop_assert_eq!(content, Some(value.clone()));
        let out = t.run(&TranslateRequest::new(text, now()));
        let expected = format!("ecm:fulltext = '{}'", value);
        prop_assert!(out.query.contains(&expected));
    }

    /// Substituting literals back into the masked text yields the normalized text.
    #[test]
    fn normalizer_reconstructs_text(text in "\\PC{0,80}") {
        let input = NormalizedInput::new(&text);
        prop_assert_eq!(input.reconstruct(), input.text.clone());
        for token in &input.tokens {
            prop_assert_eq!(&input.masked[token.span.start..token.span.end], token.text.as_str());
        }
    }

    /// Trace entries are ordered by their position in the input.
    #[test]
    fn trace_is_ordered(text in sentence_strategy()) {
        let t = Translator::new(TranslatorConfig::default());
        let result = t.translate(&text, now());
        let starts: Vec<usize> = result.trace.iter().map(|e| e.span.start).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }
}
