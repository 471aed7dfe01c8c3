//! fc-server: the responder side of farclip
//!
//! Accepts TCP connections, filters them through the configured allow-list,
//! and services clipboard and open requests on admitted connections. Each
//! connection is driven by a handler that owns the peer's address, so a
//! request is always correlated with the connection it arrived on.

pub mod clipboard;
pub mod error;
pub mod gate;
pub mod handler;
pub mod opener;
pub mod translate;

pub use clipboard::{Clipboard, SystemClipboard};
pub use error::ServerError;
pub use gate::Server;
pub use opener::{SystemOpener, UriOpener};
pub use translate::translate_loopback;
