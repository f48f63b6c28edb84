//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::{avatar, page, profile, resolve, search, store, watch};

/// Explore paginated list endpoints with lazy media resolution.
#[derive(Parser, Debug)]
#[command(name = "lazylist")]
#[command(author, version = env!("LAZYLIST_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the saved endpoint profile
    Profile(profile::ProfileCommand),

    /// Fetch pages through the list cache
    Page(page::PageArgs),

    /// Run a server-side search
    Search(search::SearchArgs),

    /// Resolve media for items on the first page
    Resolve(resolve::ResolveArgs),

    /// Print the placeholder avatar for a name
    Avatar(avatar::AvatarArgs),

    /// Load the first page and apply realtime patches as they arrive
    Watch(watch::WatchArgs),

    /// Create or replace an item in a local file store
    Put(store::PutArgs),

    /// Delete an item from a local file store
    Delete(store::DeleteArgs),
}

/// Endpoint flags shared by every command that talks to a source.
///
/// Flags override `LAZYLIST_SOURCE`, which overrides the saved profile.
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Source base URL (https://..., or file:// for a local store)
    #[arg(long, env = "LAZYLIST_SOURCE")]
    pub source: Option<String>,

    /// Signer base URL (defaults to the source)
    #[arg(long)]
    pub signer: Option<String>,

    /// Realtime path under the source, for WebSocket sources
    #[arg(long)]
    pub events_path: Option<String>,

    /// Bearer token sent with every request
    #[arg(long)]
    pub token: Option<String>,

    /// List command name
    #[arg(long)]
    pub command: Option<String>,

    /// Search command name
    #[arg(long)]
    pub search_command: Option<String>,

    /// Payload field holding the item id
    #[arg(long)]
    pub id_field: Option<String>,

    /// Payload field holding the media key(s)
    #[arg(long)]
    pub media_field: Option<String>,
}
