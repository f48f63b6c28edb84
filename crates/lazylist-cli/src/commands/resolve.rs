//! Resolve command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use lazylist::{ItemId, ResolvedMedia};

use crate::backend::Backend;
use crate::cli::SourceArgs;
use crate::output;
use crate::profile::storage;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Item ids to resolve, as if they had scrolled into view
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ResolveArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args.source);
    let backend = Backend::connect(&profile)?;
    let screen = backend.screen()?;

    let ids = args
        .ids
        .iter()
        .map(ItemId::new)
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid item id")?;

    screen
        .load_more()
        .await
        .context("Failed to fetch the first page")?;

    for id in ids.iter().filter(|id| !screen.cache().contains(id)) {
        output::warning(&format!("{} is not on the first page", id));
    }

    for (id, media) in screen.on_viewable_items_changed(&ids).await {
        if args.json {
            output::json(&json!({"id": id, "media": media}))?;
            continue;
        }
        match media {
            ResolvedMedia::Url(url) => println!("{} {} {}", id, "URL".green(), url),
            ResolvedMedia::Placeholder(p) => println!(
                "{} {} {} {} on {}",
                id,
                "PLACEHOLDER".yellow(),
                p.initials,
                p.text_color,
                p.background_color
            ),
        }
    }

    Ok(())
}
