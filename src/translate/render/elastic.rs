//! Elasticsearch request-body rendering for the repository and audit indexes.

use chrono::NaiveDateTime;
use serde_json::{Map, Value, json};

use crate::translate::predicate::{
    ContentMatch, ContentTarget, DateField, DateRange, Direction, LimitSpec, Operator, ParseResult,
    PathFilter, Predicate, SearchIndex, SortField, SortSpec, StateFilter, TypeFilter, UserFilter,
    UserRole, VersionFacet,
};

const FULLTEXT_FIELDS: [&str; 2] = ["ecm:fulltext", "ecm:fulltext.title^2"];

/// Fields that carry highlight snippets on the repository index.
const HIGHLIGHT_FIELDS: [&str; 3] = ["dc:title", "dc:description", "ecm:fulltext"];

/// Request-body extras that do not come from the sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyOptions {
    /// Ask for highlight snippets. Ignored on the audit index.
    pub highlight: bool,
    pub source_includes: Vec<String>,
    pub source_excludes: Vec<String>,
}

/// Whether a clause scores (`must`) or only filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Must(Value),
    Filter(Value),
}

impl Clause {
    pub fn value(&self) -> &Value {
        match self {
            Self::Must(v) | Self::Filter(v) => v,
        }
    }
}

/// Index field a concept lives in; `None` when the index has no such field.
#[derive(Debug, Clone, Copy)]
enum Field {
    PrimaryType,
    MimeType,
    Lifecycle,
    Trashed,
    LatestVersion,
    IsVersion,
    Proxy,
    CheckedIn,
    Created,
    Modified,
    Creator,
    LastContributor,
    Title,
    Path,
}

fn field(index: SearchIndex, f: Field) -> Option<&'static str> {
    match index {
        SearchIndex::Repository => Some(match f {
            Field::PrimaryType => "ecm:primaryType",
            Field::MimeType => "file:content.mime-type",
            Field::Lifecycle => "ecm:currentLifeCycleState",
            Field::Trashed => "ecm:isTrashed",
            Field::LatestVersion => "ecm:isLatestVersion",
            Field::IsVersion => "ecm:isVersion",
            Field::Proxy => "ecm:isProxy",
            Field::CheckedIn => "ecm:isCheckedIn",
            Field::Created => "dc:created",
            Field::Modified => "dc:modified",
            Field::Creator => "dc:creator",
            Field::LastContributor => "dc:lastContributor",
            Field::Title => "dc:title",
            Field::Path => "ecm:path",
        }),
        SearchIndex::Audit => match f {
            Field::PrimaryType => Some("docType"),
            Field::Lifecycle => Some("docLifeCycle"),
            Field::Created | Field::Modified => Some("eventDate"),
            Field::Creator | Field::LastContributor => Some("principalName"),
            Field::Path => Some("docPath"),
            _ => None,
        },
    }
}

fn term(field: &str, value: impl Into<Value>) -> Value {
    json!({ "term": { field: value.into() } })
}

fn iso(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Escape Lucene regexp metacharacters.
fn regexp_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if r#".?+*|{}[]()"\#@&<>~"#.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The clauses one predicate contributes on `index`.
pub fn predicate(p: &Predicate, index: SearchIndex) -> Vec<Clause> {
    match p {
        Predicate::Type(t) => type_clauses(t, index),
        Predicate::State(s) => state_clauses(s, index),
        Predicate::Date(r) => date_clause(r, index).into_iter().collect(),
        Predicate::User(u) => user_clause(u, index).into_iter().collect(),
        Predicate::Content(c) => content_clause(c, index).into_iter().collect(),
        Predicate::Path(p) => path_clause(p, index).into_iter().collect(),
    }
}

fn type_clauses(t: &TypeFilter, index: SearchIndex) -> Vec<Clause> {
    let mut out = Vec::new();
    if !t.doc_type.is_generic() {
        if let Some(f) = field(index, Field::PrimaryType) {
            out.push(Clause::Filter(term(f, t.doc_type.name())));
        }
    }
    if let (Some(mime), Some(f)) = (&t.format, field(index, Field::MimeType)) {
        out.push(Clause::Filter(term(f, mime.as_str())));
    }
    out
}

fn state_clauses(s: &StateFilter, index: SearchIndex) -> Vec<Clause> {
    let mut facets: Vec<(Field, Value)> = Vec::new();
    if let Some(lifecycle) = s.lifecycle {
        facets.push((Field::Lifecycle, lifecycle.state_name().into()));
    }
    if let Some(trashed) = s.trashed {
        facets.push((Field::Trashed, trashed.into()));
    }
    match s.version {
        Some(VersionFacet::Latest) => facets.push((Field::LatestVersion, true.into())),
        Some(VersionFacet::Version) => facets.push((Field::IsVersion, true.into())),
        Some(VersionFacet::NotVersion) => facets.push((Field::IsVersion, false.into())),
        None => {}
    }
    if let Some(proxy) = s.proxy {
        facets.push((Field::Proxy, proxy.into()));
    }
    if let Some(checked_in) = s.checked_in {
        facets.push((Field::CheckedIn, checked_in.into()));
    }
    facets
        .into_iter()
        .filter_map(|(f, value)| field(index, f).map(|name| Clause::Filter(term(name, value))))
        .collect()
}

fn date_clause(r: &DateRange, index: SearchIndex) -> Option<Clause> {
    let f = match r.field {
        DateField::Created => Field::Created,
        DateField::Modified => Field::Modified,
    };
    let name = field(index, f)?;
    let mut bounds = Map::new();
    if let Some(start) = r.start {
        bounds.insert("gte".into(), iso(start).into());
    }
    if let Some(end) = r.end {
        let op = if end.inclusive { "lte" } else { "lt" };
        bounds.insert(op.into(), iso(end.at).into());
    }
    Some(Clause::Filter(json!({ "range": { name: bounds } })))
}

fn user_clause(u: &UserFilter, index: SearchIndex) -> Option<Clause> {
    let f = match u.role {
        UserRole::Creator => Field::Creator,
        UserRole::LastContributor => Field::LastContributor,
    };
    Some(Clause::Filter(term(field(index, f)?, u.name.as_str())))
}

fn content_clause(c: &ContentMatch, index: SearchIndex) -> Option<Clause> {
    if index == SearchIndex::Audit {
        return None;
    }
    let title = field(index, Field::Title)?;
    Some(match (c.target, c.op) {
        (ContentTarget::FullText, _) => Clause::Must(json!({
            "simple_query_string": {
                "query": c.value,
                "fields": FULLTEXT_FIELDS,
                "default_operator": "AND",
            }
        })),
        (ContentTarget::Title, Operator::Contains) => {
            Clause::Must(json!({ "match": { title: c.value } }))
        }
        (ContentTarget::Title, Operator::StartsWith) => {
            Clause::Filter(json!({ "prefix": { title: c.value } }))
        }
        (ContentTarget::Title, _) => Clause::Filter(term(title, c.value.as_str())),
    })
}

fn path_clause(p: &PathFilter, index: SearchIndex) -> Option<Clause> {
    let name = field(index, Field::Path)?;
    let base = p.path.trim_end_matches('/');
    Some(Clause::Filter(match p.op {
        Operator::Equals => json!({
            "regexp": { name: format!("{}/[^/]+", regexp_escape(base)) }
        }),
        _ if base.is_empty() => json!({ "prefix": { name: "/" } }),
        _ => json!({
            "bool": {
                "should": [
                    term(name, base),
                    { "prefix": { name: format!("{base}/") } },
                ]
            }
        }),
    }))
}

/// Sort entries for `index`; fields the index lacks are dropped.
pub fn sort(s: &SortSpec, index: SearchIndex) -> Option<Value> {
    let name = match (index, s.field) {
        (SearchIndex::Repository, f) => super::nxql::sort_field(f).replace('/', "."),
        (SearchIndex::Audit, SortField::Created | SortField::Modified) => "eventDate".into(),
        (SearchIndex::Audit, SortField::Creator) => "principalName".into(),
        (SearchIndex::Audit, SortField::Path) => "docPath".into(),
        (SearchIndex::Audit, _) => return None,
    };
    let order = match s.direction {
        Direction::Ascending => "asc",
        Direction::Descending => "desc",
    };
    Some(json!([{ name: { "order": order } }]))
}

/// Fold clauses into one query: `match_all`, a single bare clause, or a `bool`.
pub fn combine(clauses: Vec<Clause>) -> Value {
    if clauses.len() == 1 {
        if let Some(only) = clauses.first() {
            return only.value().clone();
        }
    }
    let (mut must, mut filter) = (Vec::new(), Vec::new());
    for clause in clauses {
        match clause {
            Clause::Must(v) => must.push(v),
            Clause::Filter(v) => filter.push(v),
        }
    }
    if must.is_empty() && filter.is_empty() {
        return json!({ "match_all": {} });
    }
    let mut bool_query = Map::new();
    if !must.is_empty() {
        bool_query.insert("must".into(), Value::Array(must));
    }
    if !filter.is_empty() {
        bool_query.insert("filter".into(), Value::Array(filter));
    }
    json!({ "bool": bool_query })
}

/// The complete search request body.
pub fn render(result: &ParseResult, default_page_size: u32, options: &BodyOptions) -> Value {
    let clauses: Vec<Clause> = result
        .predicates
        .iter()
        .flat_map(|p| predicate(p, result.index))
        .collect();
    let LimitSpec {
        page_size,
        page_index,
    } = result.limit.unwrap_or(LimitSpec {
        page_size: default_page_size,
        page_index: None,
    });
    let from = u64::from(page_index.unwrap_or(0)) * u64::from(page_size);

    let mut body = Map::new();
    body.insert("query".into(), combine(clauses));
    body.insert("size".into(), page_size.into());
    body.insert("from".into(), from.into());
    if let Some(sort) = result.sort.as_ref().and_then(|s| sort(s, result.index)) {
        body.insert("sort".into(), sort);
    }
    if let Some(source) = source_filter(options) {
        body.insert("_source".into(), source);
    }
    if options.highlight && result.index == SearchIndex::Repository {
        let fields: Map<String, Value> = HIGHLIGHT_FIELDS
            .iter()
            .map(|f| ((*f).to_string(), json!({})))
            .collect();
        body.insert("highlight".into(), json!({ "fields": fields }));
    }
    Value::Object(body)
}

fn source_filter(options: &BodyOptions) -> Option<Value> {
    if options.source_includes.is_empty() && options.source_excludes.is_empty() {
        return None;
    }
    let mut source = Map::new();
    if !options.source_includes.is_empty() {
        source.insert("includes".into(), json!(options.source_includes));
    }
    if !options.source_excludes.is_empty() {
        source.insert("excludes".into(), json!(options.source_excludes));
    }
    Some(Value::Object(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::predicate::{DocType, Lifecycle};

    #[test]
    fn empty_is_match_all() {
        let body = render(&ParseResult::empty(), 20, &BodyOptions::default());
        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["size"], 20);
        assert_eq!(body["from"], 0);
    }

    #[test]
    fn single_clause_unwrapped() {
        let result = ParseResult {
            predicates: vec![Predicate::Type(TypeFilter { doc_type: DocType::Invoice, format: None })],
            ..ParseResult::empty()
        };
        let body = render(&result, 20, &BodyOptions::default());
        assert_eq!(body["query"], json!({ "term": { "ecm:primaryType": "Invoice" } }));
    }

    #[test]
    fn fulltext_goes_to_must() {
        let result = ParseResult {
            predicates: vec![
                Predicate::Type(TypeFilter { doc_type: DocType::Note, format: None }),
                Predicate::Content(ContentMatch {
                    target: ContentTarget::FullText,
                    op: Operator::Contains,
                    value: "budget".into(),
                }),
            ],
            ..ParseResult::empty()
        };
        let body = render(&result, 20, &BodyOptions::default());
        let must = &body["query"]["bool"]["must"][0]["simple_query_string"];
        assert_eq!(must["query"], "budget");
        assert_eq!(must["default_operator"], "AND");
        assert_eq!(body["query"]["bool"]["filter"][0]["term"]["ecm:primaryType"], "Note");
    }

    #[test]
    fn audit_index_maps_fields_and_drops_unknown() {
        let state = StateFilter {
            lifecycle: Some(Lifecycle::Published),
            trashed: Some(true),
            ..Default::default()
        };
        let clauses = state_clauses(&state, SearchIndex::Audit);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].value(), &term("docLifeCycle", "approved"));

        let user = UserFilter { role: UserRole::LastContributor, name: "bob".into() };
        assert_eq!(
            user_clause(&user, SearchIndex::Audit).unwrap().value(),
            &term("principalName", "bob")
        );
    }

    #[test]
    fn paging_and_sort() {
        let result = ParseResult {
            sort: Some(SortSpec { field: SortField::Size, direction: Direction::Descending }),
            limit: Some(LimitSpec { page_size: 10, page_index: Some(3) }),
            ..ParseResult::empty()
        };
        let body = render(&result, 20, &BodyOptions::default());
        assert_eq!(body["size"], 10);
        assert_eq!(body["from"], 30);
        assert_eq!(body["sort"], json!([{ "file:content.length": { "order": "desc" } }]));
    }

    #[test]
    fn highlight_and_source_filter() {
        let options = BodyOptions {
            highlight: true,
            source_includes: vec!["dc:title".into(), "ecm:path".into()],
            source_excludes: vec!["file:content".into()],
        };
        let body = render(&ParseResult::empty(), 20, &options);
        assert_eq!(
            body["highlight"],
            json!({ "fields": { "dc:title": {}, "dc:description": {}, "ecm:fulltext": {} } })
        );
        assert_eq!(
            body["_source"],
            json!({ "includes": ["dc:title", "ecm:path"], "excludes": ["file:content"] })
        );

        let plain = render(&ParseResult::empty(), 20, &BodyOptions::default());
        assert!(plain.get("highlight").is_none());
        assert!(plain.get("_source").is_none());
    }

    #[test]
    fn no_highlight_on_audit_index() {
        let result = ParseResult {
            index: SearchIndex::Audit,
            ..ParseResult::empty()
        };
        let options = BodyOptions {
            highlight: true,
            ..Default::default()
        };
        assert!(render(&result, 20, &options).get("highlight").is_none());
    }

    #[test]
    fn path_queries() {
        let subtree = PathFilter { op: Operator::StartsWith, path: "/ws".into() };
        let v = path_clause(&subtree, SearchIndex::Repository).unwrap();
        assert_eq!(v.value()["bool"]["should"][1]["prefix"]["ecm:path"], "/ws/");

        let children = PathFilter { op: Operator::Equals, path: "/a.b".into() };
        let v = path_clause(&children, SearchIndex::Repository).unwrap();
        assert_eq!(v.value()["regexp"]["ecm:path"], r"/a\.b/[^/]+");
    }
}
