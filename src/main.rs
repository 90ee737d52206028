//! nxql-translate CLI: translate natural-language search requests into queries.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use nxql_translate::config::{Dialect, TranslatorConfig};
use nxql_translate::error::NlqError;
use nxql_translate::translate::{BodyOptions, SearchIndex, TranslateRequest, Translator};

#[derive(Parser)]
#[command(
    name = "nxql-translate",
    version,
    about = "Translate natural-language search requests into NXQL"
)]
struct Cli {
    /// TOML translator configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one request and print the query.
    Translate {
        /// The request, e.g. "draft invoices from this week sorted by date".
        text: String,

        /// Reference instant for relative dates (defaults to the local clock).
        #[arg(long, value_parser = parse_now)]
        now: Option<NaiveDateTime>,

        /// Output dialect: nxql or elasticsearch (es).
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Print which phrase produced which clause.
        #[arg(long)]
        explain: bool,

        /// Page size, overriding any count in the text.
        #[arg(long)]
        page_size: Option<u32>,

        /// Zero-based page index.
        #[arg(long)]
        page_index: Option<u32>,

        /// Caller identity used for "my" and "mine".
        #[arg(long)]
        user: Option<String>,

        /// Target index: repository or audit (detected when omitted).
        #[arg(long)]
        index: Option<SearchIndex>,

        /// Elasticsearch: request highlight snippets.
        #[arg(long)]
        highlight: bool,

        /// Elasticsearch: field to return in `_source` (repeatable).
        #[arg(long = "source-include")]
        source_include: Vec<String>,

        /// Elasticsearch: field to leave out of `_source` (repeatable).
        #[arg(long = "source-exclude")]
        source_exclude: Vec<String>,

        /// Print the full translation as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the known vocabulary.
    Lexicon,
}

/// Accept `2024-06-12T15:30:00`, `2024-06-12 15:30:00`, or `2024-06-12`.
fn parse_now(value: &str) -> std::result::Result<NaiveDateTime, NlqError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| NlqError::InvalidReferenceTime {
            value: value.to_string(),
        })
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TranslatorConfig::load(path)?,
        None => TranslatorConfig::default(),
    };
    let translator = Translator::new(config);

    match cli.command {
        Commands::Translate {
            text,
            now,
            dialect,
            explain,
            page_size,
            page_index,
            user,
            index,
            highlight,
            source_include,
            source_exclude,
            json,
        } => {
            let now = now.unwrap_or_else(|| chrono::Local::now().naive_local());
            let request = TranslateRequest {
                text,
                now,
                explain,
                page_size,
                page_index,
                caller: user,
                dialect,
                index,
                body: BodyOptions {
                    highlight,
                    source_includes: source_include,
                    source_excludes: source_exclude,
                },
            };
            let translation = translator.run(&request);

            if json {
                let out = serde_json::to_string_pretty(&translation).into_diagnostic()?;
                println!("{out}");
                return Ok(());
            }

            println!("{}", translation.query);
            if let Some(lines) = &translation.explanation {
                println!();
                println!("{}", translation.summary);
                for line in lines {
                    println!("  {line}");
                }
            }
        }

        Commands::Lexicon => {
            let lexicon = translator.lexicon();
            println!("Type words:");
            for (word, filter) in lexicon.type_words() {
                match &filter.format {
                    Some(mime) => println!("  {word:<14} {} ({mime})", filter.doc_type),
                    None => println!("  {word:<14} {}", filter.doc_type),
                }
            }
            println!();
            println!("Keywords:");
            println!("  {}", lexicon.keywords().collect::<Vec<_>>().join(", "));
            println!();
            println!("Filler words:");
            println!("  {}", lexicon.fillers().collect::<Vec<_>>().join(", "));
        }
    }

    Ok(())
}
