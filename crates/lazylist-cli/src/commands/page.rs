//! Page command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use lazylist::{Cursor, FetchOutcome, PaginatedListCache};

use crate::backend::Backend;
use crate::cli::SourceArgs;
use crate::output;
use crate::profile::storage;

#[derive(Args, Debug)]
pub struct PageArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Size of the first request (later requests adapt to latency)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Resume from a cursor printed by an earlier run (JSON or a bare token)
    #[arg(long)]
    pub cursor: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: PageArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args.source);
    let mut backend = Backend::connect(&profile)?;

    if let Some(limit) = args.limit {
        let sizes = &mut backend.config.page_size;
        sizes.initial = limit;
        sizes.min = sizes.min.min(limit);
        sizes.max = sizes.max.max(limit);
    }

    let cache = PaginatedListCache::new(backend.source.clone(), &backend.config)
        .context("Invalid list configuration")?;

    if let Some(cursor) = &args.cursor {
        cache.resume_from(parse_cursor(cursor));
    }

    for n in 1..=args.pages {
        let requested = cache.next_page_size();

        match cache.fetch_next().await.context("Failed to fetch page")? {
            FetchOutcome::Fetched { page, added } => {
                eprintln!(
                    "{} {} requested {}, received {}, {} new",
                    "PAGE".green(),
                    n,
                    requested,
                    page.items.len(),
                    added
                );
                for item in &page.items {
                    output::json_as(&backend.schema.to_value(item), args.pretty)?;
                }
            }
            FetchOutcome::Exhausted => break,
            other => {
                output::warning(&format!("fetch did not run: {:?}", other));
                break;
            }
        }
    }

    eprintln!();
    match cache.cursor() {
        Some(cursor) => eprintln!("{}: {}", "Next cursor".dimmed(), cursor.as_value()),
        None => output::note("No more pages."),
    }
    if cache.is_empty() {
        output::note("No items found.");
    }

    Ok(())
}

/// Accept `{"id": "u1"}`, `"u1"` or a bare `u1`.
fn parse_cursor(raw: &str) -> Cursor {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::String(_) | Value::Object(_))) => {
            Cursor::from_value(value).unwrap_or_else(|| Cursor::token(raw))
        }
        _ => Cursor::token(raw),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cursor_accepts_json_and_bare_tokens() {
        assert_eq!(parse_cursor("u02"), Cursor::token("u02"));
        assert_eq!(parse_cursor("\"u02\""), Cursor::token("u02"));
        assert_eq!(parse_cursor("42"), Cursor::token("42"));
        assert_eq!(
            parse_cursor(r#"{"post_id":"p9"}"#).as_value(),
            &json!({"post_id": "p9"})
        );
    }
}
