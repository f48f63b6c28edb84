//! lazylist-http - Network collaborators for lazylist.
//!
//! - [`HttpDataSource`]: list and search over JSON POST commands
//! - [`HttpObjectSigner`]: storage keys to signed URLs
//! - [`WsEventSource`]: realtime patches over a WebSocket

mod client;
mod realtime;
mod signer;
mod source;
mod wire;

pub use client::HttpClient;
pub use realtime::{WsEventSource, WsEventStream};
pub use signer::{DEFAULT_SIGN_COMMAND, HttpObjectSigner};
pub use source::HttpDataSource;
