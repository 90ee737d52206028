//! Human-readable explanations derived from a [`ParseResult`].

use super::predicate::{
    ContentTarget, DateField, Direction, Operator, ParseResult, Predicate, SearchIndex, SortField,
    UserRole, VersionFacet,
};
use super::render::render_item;
use crate::config::Dialect;

/// One line per trace entry (`"phrase" → category: clause`), then the full query.
pub fn explain(result: &ParseResult, dialect: Dialect, rendered: &str) -> Vec<String> {
    let mut lines: Vec<String> = result
        .trace
        .iter()
        .map(|entry| {
            let category = if entry.fallback {
                format!("{} (fallback)", entry.category)
            } else {
                entry.category.to_string()
            };
            format!(
                "\"{}\" → {category}: {}",
                entry.phrase,
                render_item(&entry.resolved, dialect, result.index)
            )
        })
        .collect();
    lines.push(format!("query: {rendered}"));
    lines
}

/// A one-sentence description, e.g.
/// `Searching for invoices, where creator is john, ordered by title ascending, limited to 10 results`.
pub fn summary(result: &ParseResult) -> String {
    let mut parts = Vec::new();
    let subject = match result.index {
        SearchIndex::Audit => "audit events".to_string(),
        SearchIndex::Repository => plural(result.doc_type().name()),
    };
    parts.push(format!("Searching for {subject}"));

    let conditions: Vec<String> = result.predicates.iter().flat_map(describe).collect();
    if !conditions.is_empty() {
        parts.push(format!("where {}", conditions.join(" and ")));
    }
    if let Some(sort) = &result.sort {
        let direction = match sort.direction {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        };
        parts.push(format!("ordered by {} {direction}", sort_name(sort.field)));
    }
    if let Some(limit) = &result.limit {
        match limit.page_index {
            Some(page) => parts.push(format!(
                "limited to {} results (page {})",
                limit.page_size,
                u64::from(page) + 1
            )),
            None => parts.push(format!("limited to {} results", limit.page_size)),
        }
    }
    parts.join(", ")
}

fn plural(type_name: &str) -> String {
    let lower = type_name.to_lowercase();
    if lower.ends_with('s') {
        lower
    } else {
        format!("{lower}s")
    }
}

fn describe(p: &Predicate) -> Vec<String> {
    match p {
        Predicate::Type(t) => t
            .format
            .iter()
            .map(|mime| format!("format is {mime}"))
            .collect(),
        Predicate::State(s) => {
            let mut out = Vec::new();
            if let Some(lifecycle) = s.lifecycle {
                out.push(format!("state is {}", lifecycle.state_name()));
            }
            match s.trashed {
                Some(true) => out.push("document is in the trash".into()),
                Some(false) => out.push("document is not in the trash".into()),
                None => {}
            }
            match s.version {
                Some(VersionFacet::Latest) => out.push("document is the latest version".into()),
                Some(VersionFacet::Version) => out.push("document is a version".into()),
                Some(VersionFacet::NotVersion) => out.push("document is not a version".into()),
                None => {}
            }
            if let Some(proxy) = s.proxy {
                let text = if proxy { "document is a proxy" } else { "document is not a proxy" };
                out.push(text.to_string());
            }
            if let Some(checked_in) = s.checked_in {
                let text = if checked_in { "document is checked in" } else { "document is checked out" };
                out.push(text.to_string());
            }
            out
        }
        Predicate::Date(r) => {
            let field = match r.field {
                DateField::Created => "creation date",
                DateField::Modified => "modification date",
            };
            let mut out = Vec::new();
            if let Some(start) = r.start {
                out.push(format!("{field} >= {}", start.format("%Y-%m-%d %H:%M")));
            }
            if let Some(end) = r.end {
                let op = if end.inclusive { "<=" } else { "<" };
                out.push(format!("{field} {op} {}", end.at.format("%Y-%m-%d %H:%M")));
            }
            out
        }
        Predicate::User(u) => {
            let role = match u.role {
                UserRole::Creator => "creator",
                UserRole::LastContributor => "last contributor",
            };
            vec![format!("{role} is {}", u.name)]
        }
        Predicate::Content(c) => {
            let target = match c.target {
                ContentTarget::FullText => "content",
                ContentTarget::Title => "title",
            };
            let verb = match c.op {
                Operator::Equals => "is",
                Operator::StartsWith => "starts with",
                _ => "contains",
            };
            vec![format!("{target} {verb} {}", c.value)]
        }
        Predicate::Path(p) => match p.op {
            Operator::Equals => vec![format!("in folder {}", p.path)],
            _ => vec![format!("under path {}", p.path)],
        },
    }
}

fn sort_name(field: SortField) -> &'static str {
    match field {
        SortField::Title => "title",
        SortField::Name => "name",
        SortField::Created => "creation date",
        SortField::Modified => "modification date",
        SortField::Size => "file size",
        SortField::Path => "path",
        SortField::Creator => "creator",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::normalize::Span;
    use crate::translate::predicate::{
        Category, DocType, LimitSpec, Resolved, SortSpec, TraceEntry, TypeFilter, UserFilter,
    };

    fn sample() -> ParseResult {
        let invoice = Predicate::Type(TypeFilter { doc_type: DocType::Invoice, format: None });
        let john = Predicate::User(UserFilter { role: UserRole::Creator, name: "john".into() });
        ParseResult {
            predicates: vec![invoice.clone(), john.clone()],
            sort: Some(SortSpec { field: SortField::Title, direction: Direction::Ascending }),
            limit: Some(LimitSpec { page_size: 10, page_index: None }),
            trace: vec![
                TraceEntry {
                    phrase: "invoices".into(),
                    category: Category::Type,
                    resolved: Resolved::Predicate(invoice),
                    span: Span::new(0, 8),
                    fallback: false,
                },
                TraceEntry {
                    phrase: "by john".into(),
                    category: Category::User,
                    resolved: Resolved::Predicate(john),
                    span: Span::new(9, 16),
                    fallback: false,
                },
            ],
            index: SearchIndex::Repository,
            matched_structure: true,
        }
    }

    #[test]
    fn lines_per_trace_entry() {
        let lines = explain(&sample(), Dialect::Nxql, "SELECT ...");
        assert_eq!(
            lines,
            vec![
                "\"invoices\" → type: ecm:primaryType = 'Invoice'",
                "\"by john\" → user: dc:creator = 'john'",
                "query: SELECT ...",
            ]
        );
    }

    #[test]
    fn summary_sentence() {
        assert_eq!(
            summary(&sample()),
            "Searching for invoices, where creator is john, ordered by title ascending, limited to 10 results"
        );
    }

    #[test]
    fn summary_of_empty_result() {
        assert_eq!(summary(&ParseResult::empty()), "Searching for documents");
    }
}
