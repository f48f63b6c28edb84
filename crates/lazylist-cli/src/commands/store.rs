//! Put and delete commands for local file stores.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use lazylist::ItemId;

use crate::backend::Backend;
use crate::cli::SourceArgs;
use crate::output;
use crate::profile::storage;

#[derive(Args, Debug)]
pub struct PutArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Item payload as a JSON object
    pub json: String,

    /// Store this file as the item's primary media object
    #[arg(long)]
    pub media_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Item id
    pub id: String,
}

pub async fn put(args: PutArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args.source);
    let backend = Backend::connect(&profile)?;
    let store = backend.file_store()?;

    let value: serde_json::Value = serde_json::from_str(&args.json).context("Invalid JSON")?;
    let (item, kind) = store.put_value(value).context("Failed to store item")?;

    if let Some(path) = &args.media_file {
        let key = item
            .primary_media()
            .context("--media-file needs an item with a media key")?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        store.put_media(key, &bytes).context("Failed to store media")?;
    }

    output::success(&format!("{} {}", kind.as_str(), item.id));

    Ok(())
}

pub async fn delete(args: DeleteArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args.source);
    let backend = Backend::connect(&profile)?;
    let store = backend.file_store()?;

    let id = ItemId::new(&args.id).context("Invalid item id")?;
    if !store.delete_item(&id).context("Failed to delete item")? {
        bail!("Item {} not found", id);
    }

    output::success(&format!("deleted {}", id));

    Ok(())
}
