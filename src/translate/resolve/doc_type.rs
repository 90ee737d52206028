//! Document-type cues from the lexicon's synonym table.

use super::{Candidates, Hit, ResolveContext, Resolver};
use crate::translate::lexicon::TypeMatch;
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{Category, Predicate, Resolved};

/// An exact word that also names a format, so `pdf files` keeps the mime type.
const EXACT_FORMAT: u8 = 4;
const EXACT: u8 = 3;
const FUZZY: u8 = 2;
const GENERIC: u8 = 1;

pub struct TypeResolver;

impl Resolver for TypeResolver {
    fn category(&self) -> Category {
        Category::Type
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);
        for token in input.tokens.iter().filter(|t| !t.is_literal()) {
            let Some(found) = ctx.lexicon.match_type(&token.text) else {
                continue;
            };
            let filter = found.filter();
            let priority = match found {
                _ if filter.doc_type.is_generic() && filter.format.is_none() => GENERIC,
                TypeMatch::Exact(_) if filter.format.is_some() => EXACT_FORMAT,
                TypeMatch::Exact(_) => EXACT,
                TypeMatch::Fuzzy(_) => FUZZY,
            };
            candidates.offer(token.span, Resolved::Predicate(Predicate::Type(filter.clone())), priority);
        }
        candidates.into_hits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::predicate::{DocType, TypeFilter};
    use crate::translate::resolve::test_support::run;

    fn types(text: &str) -> Vec<(TypeFilter, u8)> {
        let (_, hits) = run(&TypeResolver, text);
        hits.into_iter()
            .map(|h| match h.resolved {
                Resolved::Predicate(Predicate::Type(t)) => (t, h.priority),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn exact_type_outranks_generic() {
        let t = types("invoice documents");
        assert_eq!(t.len(), 2);
        assert_eq!((t[0].0.doc_type.clone(), t[0].1), (DocType::Invoice, EXACT));
        assert_eq!((t[1].0.doc_type.clone(), t[1].1), (DocType::Document, GENERIC));
    }

    #[test]
    fn fuzzy_type() {
        let t = types("all invoces");
        assert_eq!(t.len(), 1);
        assert_eq!((t[0].0.doc_type.clone(), t[0].1), (DocType::Invoice, FUZZY));
    }

    #[test]
    fn literal_never_a_type() {
        assert!(types("named 'invoice'").is_empty());
    }

    #[test]
    fn pdf_format() {
        let t = types("pdfs");
        assert_eq!(t[0].0.format.as_deref(), Some("application/pdf"));
        assert_eq!(t[0].1, EXACT_FORMAT);
    }

    #[test]
    fn format_word_outranks_plain_type_word() {
        let t = types("pdf files");
        assert_eq!(t.len(), 2);
        assert_eq!((t[0].0.format.as_deref(), t[0].1), (Some("application/pdf"), EXACT_FORMAT));
        assert_eq!((t[1].0.doc_type.clone(), t[1].1), (DocType::File, EXACT));
    }
}
