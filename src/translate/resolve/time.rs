//! Date cues, resolved against the caller-supplied reference instant.
//!
//! Calendar windows (`today`, `this week`, `last month`) are half-open.
//! Back-offs (`last 3 days`, `within the last week`) run from `now − n units`
//! up to and including `now`. Explicit ISO dates bound open-ended ranges.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use regex::{Captures, Regex};

use super::{Candidates, Hit, ResolveContext, Resolver, span_of};
use crate::translate::calendar::{self, Unit};
use crate::translate::normalize::{NormalizedInput, Span};
use crate::translate::predicate::{Category, DateField, DateRange, Predicate, RangeEnd, Resolved};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// `[now − n units, now]`; `n` from the `n` group or 1.
    Back,
    /// The calendar period containing now.
    This,
    /// The calendar period before the current one.
    Last,
    Today,
    Yesterday,
    Since,
    Before,
    On,
    Between,
}

const DATE: &str = r"\d{4}[-/]\d{2}[-/]\d{2}";
const UNITS: &str = r"days?|weeks?|months?|years?";

static WINDOWS: LazyLock<Vec<(Regex, Window)>> = LazyLock::new(|| {
    [
        (format!(r"(?:in|within)\s+the\s+(?:last|past)\s+(?P<n>\d+)\s+(?P<unit>{UNITS})"), Window::Back),
        (r"(?:in|within)\s+(?:the\s+)?(?:last|past)\s+(?P<unit>day|week|month|year)".to_string(), Window::Back),
        (format!(r"(?:last|past)\s+(?P<n>\d+)\s+(?P<unit>{UNITS})"), Window::Back),
        ("today".to_string(), Window::Today),
        ("yesterday".to_string(), Window::Yesterday),
        (r"this\s+(?P<unit>week|month|year)".to_string(), Window::This),
        (r"last\s+(?P<unit>week|month|year)".to_string(), Window::Last),
        (r"past\s+(?P<unit>day|week|month|year)".to_string(), Window::Back),
        (format!(r"between\s+(?P<d1>{DATE})\s+and\s+(?P<d2>{DATE})"), Window::Between),
        (format!(r"(?:since|after|from)\s+(?P<d1>{DATE})"), Window::Since),
        (format!(r"before\s+(?P<d1>{DATE})"), Window::Before),
        (format!(r"on\s+(?P<d1>{DATE})"), Window::On),
    ]
    .into_iter()
    .map(|(window, kind)| {
        let full = format!(
            r"\b(?:(?P<field>created|modified|updated|changed|edited)\s+)?(?:(?:from|during|of)\s+)?(?:{window})\b"
        );
        (Regex::new(&full).unwrap(), kind)
    })
    .collect()
});

pub struct TimeResolver;

impl Resolver for TimeResolver {
    fn category(&self) -> Category {
        Category::Time
    }

    fn attempt(&self, input: &NormalizedInput, claimed: &[Span], ctx: &ResolveContext<'_>) -> Vec<Hit> {
        let mut candidates = Candidates::new(input, claimed);
        for (regex, kind) in WINDOWS.iter() {
            for caps in regex.captures_iter(&input.masked) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let field = match caps.name("field").map(|m| m.as_str()) {
                    Some("created") => DateField::Created,
                    Some(_) => DateField::Modified,
                    None => ctx.default_date_field,
                };
                let Some(range) = resolve_window(*kind, &caps, field, ctx.now) else {
                    continue;
                };
                candidates.offer(span_of(&whole), Resolved::Predicate(Predicate::Date(range)), 1);
            }
        }
        candidates.into_hits()
    }
}

fn resolve_window(kind: Window, caps: &Captures<'_>, field: DateField, now: NaiveDateTime) -> Option<DateRange> {
    let unit = caps.name("unit").and_then(|m| m.as_str().parse::<Unit>().ok());
    let date = |name: &str| caps.name(name).and_then(|m| calendar::parse_date(m.as_str()));
    let exclusive = |at: NaiveDateTime| Some(RangeEnd { at, inclusive: false });

    let (start, end) = match kind {
        Window::Back => {
            let n = match caps.name("n") {
                Some(m) => m.as_str().parse::<i64>().ok().filter(|&n| n > 0)?,
                None => 1,
            };
            let start = calendar::shift(now, unit?, -n)?;
            (Some(start), Some(RangeEnd { at: now, inclusive: true }))
        }
        Window::This => {
            let (start, end) = calendar::this_period(now, unit?)?;
            (Some(start), exclusive(end))
        }
        Window::Last => {
            let (start, end) = calendar::last_period(now, unit?)?;
            (Some(start), exclusive(end))
        }
        Window::Today => {
            let (start, end) = calendar::this_period(now, Unit::Day)?;
            (Some(start), exclusive(end))
        }
        Window::Yesterday => {
            let (start, end) = calendar::last_period(now, Unit::Day)?;
            (Some(start), exclusive(end))
        }
        Window::Since => (Some(calendar::start_of_day(date("d1")?)), None),
        Window::Before => (None, exclusive(calendar::start_of_day(date("d1")?))),
        Window::On => {
            let day = date("d1")?;
            let next = day.checked_add_signed(Duration::days(1))?;
            (Some(calendar::start_of_day(day)), exclusive(calendar::start_of_day(next)))
        }
        Window::Between => {
            let (mut first, mut second) = (date("d1")?, date("d2")?);
            if first > second {
                std::mem::swap(&mut first, &mut second);
            }
            let after = second.checked_add_signed(Duration::days(1))?;
            (Some(calendar::start_of_day(first)), exclusive(calendar::start_of_day(after)))
        }
    };

    Some(DateRange { field, start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::resolve::test_support::run;

    fn ranges(text: &str) -> Vec<DateRange> {
        let (_, hits) = run(&TimeResolver, text);
        hits.into_iter()
            .map(|h| match h.resolved {
                Resolved::Predicate(Predicate::Date(r)) => r,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    fn single(text: &str) -> DateRange {
        let r = ranges(text);
        assert_eq!(r.len(), 1, "ranges for {text:?}: {r:?}");
        r[0]
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn this_week_monday_to_monday() {
        let r = single("draft invoices from this week");
        assert_eq!(r.field, DateField::Modified);
        assert_eq!(r.start, Some(at("2024-06-10 00:00:00")));
        assert_eq!(r.end, Some(RangeEnd { at: at("2024-06-17 00:00:00"), inclusive: false }));
    }

    #[test]
    fn last_week() {
        let r = single("documents from last week");
        assert_eq!(r.start, Some(at("2024-06-03 00:00:00")));
        assert_eq!(r.end.unwrap().at, at("2024-06-10 00:00:00"));
    }

    #[test]
    fn created_prefix_selects_creation_date() {
        let r = single("files created yesterday");
        assert_eq!(r.field, DateField::Created);
        assert_eq!(r.start, Some(at("2024-06-11 00:00:00")));
        assert_eq!(r.end.unwrap().at, at("2024-06-12 00:00:00"));
    }

    #[test]
    fn back_off_is_inclusive_of_now() {
        let r = single("notes modified in the last 7 days");
        assert_eq!(r.start, Some(at("2024-06-05 15:30:00")));
        assert_eq!(r.end, Some(RangeEnd { at: at("2024-06-12 15:30:00"), inclusive: true }));

        let r = single("invoices within the last month");
        assert_eq!(r.start, Some(at("2024-05-12 15:30:00")));
        assert!(r.end.unwrap().inclusive);
    }

    #[test]
    fn explicit_dates() {
        let r = single("invoices since 2024-01-05");
        assert_eq!(r.start, Some(at("2024-01-05 00:00:00")));
        assert_eq!(r.end, None);

        let r = single("invoices before 2024-01-05");
        assert_eq!(r.start, None);
        assert_eq!(r.end, Some(RangeEnd { at: at("2024-01-05 00:00:00"), inclusive: false }));

        let r = single("invoices between 2024-01-01 and 2024-01-31");
        assert_eq!(r.start, Some(at("2024-01-01 00:00:00")));
        assert_eq!(r.end.unwrap().at, at("2024-02-01 00:00:00"));
    }

    #[test]
    fn invalid_calendar_date_is_ignored() {
        assert!(ranges("invoices since 2024-02-30").is_empty());
    }

    #[test]
    fn huge_back_off_is_ignored() {
        assert!(ranges("files from the last 99999999999 years").is_empty());
    }

    #[test]
    fn two_cues_both_reported() {
        let r = ranges("notes from last week created today");
        assert_eq!(r.len(), 2);
        assert_eq!(r[1].field, DateField::Created);
    }
}
