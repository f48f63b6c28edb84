//! Watch command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use lazylist::{AppliedPatch, EventSource, ListEvent, PaginatedListCache, PatchSubscription};

use crate::backend::Backend;
use crate::cli::SourceArgs;
use crate::output;
use crate::profile::storage;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Exit after this many patches
    #[arg(long)]
    pub count: Option<usize>,

    /// Exit after this many seconds
    #[arg(long)]
    pub for_secs: Option<u64>,

    /// Output patches as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WatchArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args.source);
    let backend = Backend::connect(&profile)?;

    let cache = Arc::new(
        PaginatedListCache::new(backend.source.clone(), &backend.config)
            .context("Invalid list configuration")?,
    );

    // Subscribe first so nothing written during the first fetch is missed.
    let events = backend
        .events
        .subscribe()
        .context("Failed to start subscription")?;

    cache
        .fetch_next()
        .await
        .context("Failed to fetch the first page")?;

    let (_subscription, mut patches) = PatchSubscription::spawn_notifying(cache.clone(), events);

    output::note(&format!("Loaded {} items. Watching for changes...", cache.len()));
    output::note("Press Ctrl+C to stop.");

    let json_output = args.json;
    let limit = args.count;
    let watch = async move {
        let mut seen = 0;
        while let Some(patch) = patches.recv().await {
            print_patch(&patch, json_output);
            seen += 1;
            if limit.is_some_and(|limit| seen >= limit) {
                return;
            }
        }
        output::warning("Realtime stream ended");
    };

    let deadline = async {
        match args.for_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = watch => {}
        _ = deadline => output::note("Time limit reached."),
        _ = tokio::signal::ctrl_c() => {}
    }

    Ok(())
}

fn print_patch(patch: &AppliedPatch, json_output: bool) {
    let id = patch.event.id();

    if json_output {
        let line = json!({
            "type": patch.event.kind().as_str(),
            "id": id,
            "applied": patch.applied,
            "len": patch.len,
        });
        if let Ok(line) = serde_json::to_string(&line) {
            println!("{}", line);
        }
        return;
    }

    let label = match &patch.event {
        ListEvent::Created(_) => "CREATED".cyan(),
        ListEvent::Updated(_) => "UPDATED".yellow(),
        ListEvent::Deleted(_) => "DELETED".red(),
    };
    let note = if patch.applied { "" } else { " (no-op)" };
    println!(
        "{} {} size {}{}",
        label,
        id,
        patch.len,
        note.dimmed()
    );
}
