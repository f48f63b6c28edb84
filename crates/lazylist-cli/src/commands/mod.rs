//! Subcommand implementations.

pub mod avatar;
pub mod page;
pub mod profile;
pub mod resolve;
pub mod search;
pub mod store;
pub mod watch;
