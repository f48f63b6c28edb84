//! Search command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use lazylist::{SearchOutcome, SearchOverlayCache, SearchQuery};

use crate::backend::Backend;
use crate::cli::SourceArgs;
use crate::output;
use crate::profile::storage;

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Text to search for
    pub text: String,

    /// Filter as field=value (value parsed as JSON when possible); repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, Value)>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: SearchArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args.source);
    let backend = Backend::connect(&profile)?;

    let overlay = SearchOverlayCache::new(backend.source.clone(), &backend.config)
        .context("Invalid list configuration")?;

    let mut query = SearchQuery::text(args.text);
    for (field, value) in args.filters {
        query = query.with_filter(field, value);
    }

    match overlay.search(query).await.context("Search failed")? {
        SearchOutcome::Shown(count) => {
            for item in overlay.snapshot().items {
                output::json_as(&backend.schema.to_value(&item), args.pretty)?;
            }
            output::note(&format!("{} result(s).", count));
        }
        SearchOutcome::Empty => output::note("No results."),
        SearchOutcome::Cleared => output::note("Empty query, nothing to search."),
        SearchOutcome::Superseded => {}
    }

    Ok(())
}

fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))?;
    if field.is_empty() {
        return Err(format!("empty field name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn filters_parse_json_or_fall_back_to_strings() {
        assert_eq!(
            parse_filter("city=Pune").unwrap(),
            ("city".to_string(), json!("Pune"))
        );
        assert_eq!(
            parse_filter("verified=true").unwrap(),
            ("verified".to_string(), json!(true))
        );
        assert!(parse_filter("nofield").is_err());
        assert!(parse_filter("=x").is_err());
    }
}
