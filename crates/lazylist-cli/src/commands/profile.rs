//! Profile subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::SourceArgs;
use crate::output;
use crate::profile::{Profile, storage};

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileSubcommand {
    /// Save endpoint settings; unspecified settings keep their saved value
    Set(SourceArgs),

    /// Display the saved profile
    Show(ShowArgs),

    /// Remove the saved profile
    Clear,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle(cmd: ProfileCommand) -> Result<()> {
    match cmd.command {
        ProfileSubcommand::Set(args) => set(args),
        ProfileSubcommand::Show(args) => show(args),
        ProfileSubcommand::Clear => clear(),
    }
}

fn set(args: SourceArgs) -> Result<()> {
    let profile = storage::load_profile()
        .context("Failed to load profile")?
        .overlay(&args);

    if let Some(source) = &profile.source {
        lazylist_core::SourceUrl::new(source).context("Invalid source URL")?;
    }

    let path = storage::save_profile(&profile).context("Failed to save profile")?;

    output::success("Profile saved");
    println!();
    print_profile(&profile);
    output::field("File", &path.display().to_string());

    Ok(())
}

fn show(args: ShowArgs) -> Result<()> {
    let profile = storage::load_profile().context("Failed to load profile")?;

    if args.json {
        let mut profile = profile;
        if profile.token.is_some() {
            profile.token = Some("<redacted>".to_string());
        }
        return output::json_pretty(&profile);
    }

    if profile == Profile::default() {
        output::note("No profile saved. Run 'lazylist profile set --source <url>'.");
        return Ok(());
    }

    print_profile(&profile);

    if let Ok(env) = std::env::var("LAZYLIST_SOURCE") {
        output::warning(&format!("LAZYLIST_SOURCE={} overrides the saved source", env));
    }

    Ok(())
}

fn clear() -> Result<()> {
    if storage::clear_profile().context("Failed to clear profile")? {
        output::success("Profile cleared");
    } else {
        output::note("No profile saved.");
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    let unset = "(not set)";
    let schema = profile.schema();

    output::field("Source", profile.source.as_deref().unwrap_or(unset));
    output::field("Signer", profile.signer.as_deref().unwrap_or("(source)"));
    output::field("Events", profile.events_path.as_deref().unwrap_or(unset));
    output::field(
        "Token",
        if profile.token.is_some() { "(set)" } else { unset },
    );
    output::field("List command", profile.command.as_deref().unwrap_or(unset));
    output::field(
        "Search command",
        profile.search_command.as_deref().unwrap_or(unset),
    );
    output::field("Id field", &schema.id_field);
    output::field("Media field", &schema.media_field);
}
