//! Benchmarks for the translation pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nxql_translate::config::{Dialect, TranslatorConfig};
use nxql_translate::translate::{NormalizedInput, TranslateRequest, Translator};

const SENTENCES: &[&str] = &[
    "find all invoices",
    "show me draft invoices from this week sorted by date",
    "documents created by john from last week sorted by title limit 10",
    "notes with title containing 'Quarterly Budget' under '/Projects/2024'",
    "quarterly budget review",
];

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 12)
        .unwrap()
        .and_hms_opt(15, 30, 0)
        .unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_5_sentences", |bench| {
        bench.iter(|| {
            for s in SENTENCES {
                black_box(NormalizedInput::new(s));
            }
        })
    });
}

fn bench_translate(c: &mut Criterion) {
    let translator = Translator::new(TranslatorConfig::default());
    c.bench_function("translate_5_sentences", |bench| {
        bench.iter(|| {
            for s in SENTENCES {
                black_box(translator.translate(s, now()));
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let translator = Translator::new(TranslatorConfig::default());
    let text = "documents created by john from last week sorted by title limit 10";

    c.bench_function("run_nxql_explain", |bench| {
        bench.iter(|| black_box(translator.run(&TranslateRequest::new(text, now()).explain(true))))
    });

    c.bench_function("run_elasticsearch", |bench| {
        bench.iter(|| {
            black_box(translator.run(&TranslateRequest::new(text, now()).dialect(Dialect::Elasticsearch)))
        })
    });
}

criterion_group!(benches, bench_normalize, bench_translate, bench_render);
criterion_main!(benches);
