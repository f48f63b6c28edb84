//! lazylist - CLI tool for exploring paginated list endpoints.
//!
//! This is a thin wrapper over the `lazylist` library: page through a list
//! with adaptive page sizes, run searches, resolve media, and watch
//! realtime patches against an HTTP endpoint or a local file store.

mod backend;
mod cli;
mod commands;
mod output;
mod profile;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{avatar, page, resolve, search, store, watch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Profile(cmd) => commands::profile::handle(cmd).await,
        Commands::Page(args) => page::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::Avatar(args) => avatar::run(args),
        Commands::Watch(args) => watch::run(args).await,
        Commands::Put(args) => store::put(args).await,
        Commands::Delete(args) => store::delete(args).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
