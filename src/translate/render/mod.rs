//! Query rendering in the supported dialects.

pub mod elastic;
pub mod nxql;

use crate::config::Dialect;
use elastic::BodyOptions;

use super::predicate::{ParseResult, Resolved, SearchIndex};

/// Render a full query. NXQL yields a statement; Elasticsearch yields a
/// compact JSON request body. `options` only apply to Elasticsearch.
pub fn render(
    result: &ParseResult,
    dialect: Dialect,
    default_page_size: u32,
    options: &BodyOptions,
) -> String {
    match dialect {
        Dialect::Nxql => nxql::render(result),
        Dialect::Elasticsearch => elastic::render(result, default_page_size, options).to_string(),
    }
}

/// Render the fragment one resolved item contributes, for explanations.
pub fn render_item(resolved: &Resolved, dialect: Dialect, index: SearchIndex) -> String {
    match (dialect, resolved) {
        (Dialect::Nxql, Resolved::Predicate(p)) => nxql::predicate(p).join(" AND "),
        (Dialect::Nxql, Resolved::Sort(s)) => nxql::order_by(s),
        (Dialect::Nxql, Resolved::Limit(l)) => nxql::limit(l),
        (Dialect::Elasticsearch, Resolved::Predicate(p)) => {
            let clauses = elastic::predicate(p, index);
            if clauses.is_empty() {
                "(no clause on this index)".into()
            } else {
                elastic::combine(clauses).to_string()
            }
        }
        (Dialect::Elasticsearch, Resolved::Sort(s)) => elastic::sort(s, index)
            .map(|v| format!("sort: {v}"))
            .unwrap_or_else(|| "(not sortable on this index)".into()),
        (Dialect::Elasticsearch, Resolved::Limit(l)) => format!(
            "size: {}, from: {}",
            l.page_size,
            u64::from(l.page_index.unwrap_or(0)) * u64::from(l.page_size)
        ),
    }
}
