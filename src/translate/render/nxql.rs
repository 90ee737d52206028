//! NXQL rendering.
//!
//! Every user-supplied value goes through [`quote`] (or [`like_pattern`] for
//! LIKE operands), so the output never contains an unescaped quote.

use chrono::NaiveDateTime;

use crate::translate::predicate::{
    ContentMatch, ContentTarget, DateField, DateRange, Direction, LimitSpec, Operator, ParseResult,
    PathFilter, Predicate, SortField, SortSpec, StateFilter, TypeFilter, UserFilter, UserRole,
    VersionFacet,
};

/// Escape backslashes and single quotes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A single-quoted string literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", escape(value))
}

/// Escape a value for use inside a LIKE pattern (wildcards included).
fn like_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A quoted LIKE pattern: `prefix` + escaped value + `suffix`.
fn like_pattern(prefix: &str, value: &str, suffix: &str) -> String {
    format!("'{prefix}{}{suffix}'", like_escape(value))
}

pub fn timestamp(at: NaiveDateTime) -> String {
    format!("TIMESTAMP '{}'", at.format("%Y-%m-%d %H:%M:%S"))
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// The conjuncts one predicate contributes to the WHERE clause.
pub fn predicate(p: &Predicate) -> Vec<String> {
    match p {
        Predicate::Type(t) => type_clauses(t),
        Predicate::State(s) => state_clauses(s),
        Predicate::Date(r) => date_clauses(r),
        Predicate::User(u) => vec![user_clause(u)],
        Predicate::Content(c) => vec![content_clause(c)],
        Predicate::Path(p) => vec![path_clause(p)],
    }
}

fn type_clauses(t: &TypeFilter) -> Vec<String> {
    if t.doc_type.is_generic() && t.format.is_none() {
        return vec!["ecm:mixinType != 'HiddenInNavigation'".into()];
    }
    let primary = format!("ecm:primaryType = {}", quote(t.doc_type.name()));
    match &t.format {
        Some(mime) => vec![format!(
            "({primary} AND file:content/mime-type = {})",
            quote(mime)
        )],
        None => vec![primary],
    }
}

fn state_clauses(s: &StateFilter) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(lifecycle) = s.lifecycle {
        out.push(format!(
            "ecm:currentLifeCycleState = {}",
            quote(lifecycle.state_name())
        ));
    }
    if let Some(trashed) = s.trashed {
        out.push(format!("ecm:isTrashed = {}", flag(trashed)));
    }
    match s.version {
        Some(VersionFacet::Latest) => out.push("ecm:isLatestVersion = 1".into()),
        Some(VersionFacet::Version) => out.push("ecm:isVersion = 1".into()),
        Some(VersionFacet::NotVersion) => out.push("ecm:isVersion = 0".into()),
        None => {}
    }
    if let Some(proxy) = s.proxy {
        out.push(format!("ecm:isProxy = {}", flag(proxy)));
    }
    if let Some(checked_in) = s.checked_in {
        out.push(format!("ecm:isCheckedIn = {}", flag(checked_in)));
    }
    out
}

fn date_field(field: DateField) -> &'static str {
    match field {
        DateField::Created => "dc:created",
        DateField::Modified => "dc:modified",
    }
}

fn date_clauses(r: &DateRange) -> Vec<String> {
    let field = date_field(r.field);
    let mut out = Vec::new();
    if let Some(start) = r.start {
        out.push(format!("{field} >= {}", timestamp(start)));
    }
    if let Some(end) = r.end {
        let op = if end.inclusive { "<=" } else { "<" };
        out.push(format!("{field} {op} {}", timestamp(end.at)));
    }
    out
}

fn user_clause(u: &UserFilter) -> String {
    let field = match u.role {
        UserRole::Creator => "dc:creator",
        UserRole::LastContributor => "dc:lastContributor",
    };
    format!("{field} = {}", quote(&u.name))
}

fn content_clause(c: &ContentMatch) -> String {
    match (c.target, c.op) {
        (ContentTarget::FullText, _) => format!("ecm:fulltext = {}", quote(&c.value)),
        (ContentTarget::Title, Operator::Contains) => {
            format!("dc:title LIKE {}", like_pattern("%", &c.value, "%"))
        }
        (ContentTarget::Title, Operator::StartsWith) => {
            format!("dc:title LIKE {}", like_pattern("", &c.value, "%"))
        }
        (ContentTarget::Title, op) => format!("dc:title {} {}", comparison(op), quote(&c.value)),
    }
}

fn comparison(op: Operator) -> &'static str {
    match op {
        Operator::Equals | Operator::Contains | Operator::StartsWith => "=",
        Operator::GreaterOrEqual => ">=",
        Operator::LessThan => "<",
        Operator::LessOrEqual => "<=",
    }
}

/// NXQL only offers `=` and `STARTSWITH` on `ecm:path`, and `=` selects the
/// folder itself, so both folder and subtree cues render as `STARTSWITH`.
fn path_clause(p: &PathFilter) -> String {
    format!("ecm:path STARTSWITH {}", quote(&p.path))
}

pub fn sort_field(field: SortField) -> &'static str {
    match field {
        SortField::Title => "dc:title",
        SortField::Name => "ecm:name",
        SortField::Created => "dc:created",
        SortField::Modified => "dc:modified",
        SortField::Size => "file:content/length",
        SortField::Path => "ecm:path",
        SortField::Creator => "dc:creator",
    }
}

pub fn order_by(s: &SortSpec) -> String {
    let direction = match s.direction {
        Direction::Ascending => "ASC",
        Direction::Descending => "DESC",
    };
    format!("ORDER BY {} {direction}", sort_field(s.field))
}

pub fn limit(l: &LimitSpec) -> String {
    match l.page_index {
        Some(page) if page > 0 => {
            let offset = u64::from(page) * u64::from(l.page_size);
            format!("LIMIT {} OFFSET {offset}", l.page_size)
        }
        _ => format!("LIMIT {}", l.page_size),
    }
}

/// The full `SELECT` statement.
pub fn render(result: &ParseResult) -> String {
    let mut clauses: Vec<String> = result.predicates.iter().flat_map(predicate).collect();
    if clauses.is_empty() {
        clauses = type_clauses(&TypeFilter::generic());
    }
    let mut query = format!("SELECT * FROM Document WHERE {}", clauses.join(" AND "));
    if let Some(sort) = &result.sort {
        query.push(' ');
        query.push_str(&order_by(sort));
    }
    if let Some(l) = &result.limit {
        query.push(' ');
        query.push_str(&limit(l));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::predicate::{DocType, Lifecycle, RangeEnd};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(quote(r"O'Brien\x"), r"'O\'Brien\\x'");
    }

    #[test]
    fn like_escapes_wildcards() {
        let c = ContentMatch {
            target: ContentTarget::Title,
            op: Operator::Contains,
            value: "50%_off".into(),
        };
        assert_eq!(content_clause(&c), r"dc:title LIKE '%50\%\_off%'");
    }

    #[test]
    fn generic_and_specific_types() {
        assert_eq!(
            type_clauses(&TypeFilter::generic()),
            vec!["ecm:mixinType != 'HiddenInNavigation'"]
        );
        let pdf = TypeFilter {
            doc_type: DocType::File,
            format: Some("application/pdf".into()),
        };
        assert_eq!(
            type_clauses(&pdf),
            vec!["(ecm:primaryType = 'File' AND file:content/mime-type = 'application/pdf')"]
        );
    }

    #[test]
    fn state_facets() {
        let s = StateFilter {
            lifecycle: Some(Lifecycle::Draft),
            trashed: Some(false),
            version: Some(VersionFacet::Latest),
            ..Default::default()
        };
        assert_eq!(
            state_clauses(&s),
            vec![
                "ecm:currentLifeCycleState = 'project'",
                "ecm:isTrashed = 0",
                "ecm:isLatestVersion = 1",
            ]
        );
    }

    #[test]
    fn date_range_bounds() {
        let r = DateRange {
            field: DateField::Created,
            start: Some(at("2024-06-10 00:00:00")),
            end: Some(RangeEnd { at: at("2024-06-17 00:00:00"), inclusive: false }),
        };
        assert_eq!(
            date_clauses(&r),
            vec![
                "dc:created >= TIMESTAMP '2024-06-10 00:00:00'",
                "dc:created < TIMESTAMP '2024-06-17 00:00:00'",
            ]
        );
    }

    #[test]
    fn folder_and_subtree_use_startswith() {
        let folder = PathFilter { op: Operator::Equals, path: "/a_b".into() };
        assert_eq!(path_clause(&folder), "ecm:path STARTSWITH '/a_b'");
        let subtree = PathFilter { op: Operator::StartsWith, path: "/O'Neil".into() };
        assert_eq!(path_clause(&subtree), r"ecm:path STARTSWITH '/O\'Neil'");
    }

    #[test]
    fn order_and_limit() {
        let s = SortSpec { field: SortField::Title, direction: Direction::Ascending };
        assert_eq!(order_by(&s), "ORDER BY dc:title ASC");
        assert_eq!(limit(&LimitSpec { page_size: 10, page_index: None }), "LIMIT 10");
        assert_eq!(
            limit(&LimitSpec { page_size: 10, page_index: Some(2) }),
            "LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn full_statement() {
        let result = ParseResult {
            predicates: vec![
                Predicate::Type(TypeFilter { doc_type: DocType::Invoice, format: None }),
                Predicate::User(UserFilter { role: UserRole::Creator, name: "john".into() }),
            ],
            sort: Some(SortSpec { field: SortField::Modified, direction: Direction::Descending }),
            limit: Some(LimitSpec { page_size: 5, page_index: None }),
            ..ParseResult::empty()
        };
        assert_eq!(
            render(&result),
            "SELECT * FROM Document WHERE ecm:primaryType = 'Invoice' AND dc:creator = 'john' \
             ORDER BY dc:modified DESC LIMIT 5"
        );
    }
}
