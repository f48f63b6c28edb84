//! Avatar command implementation.

use anyhow::Result;
use clap::Args;

use lazylist::AvatarFallbackGenerator;

use crate::output;

#[derive(Args, Debug)]
pub struct AvatarArgs {
    /// Display name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AvatarArgs) -> Result<()> {
    let placeholder = AvatarFallbackGenerator.generate(&args.name);

    if args.json {
        return output::json(&placeholder);
    }

    output::field("Initials", &placeholder.initials);
    output::field("Background", &placeholder.background_color);
    output::field("Text", &placeholder.text_color);

    Ok(())
}
