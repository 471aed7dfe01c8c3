//! Server error types

use thiserror::Error;

/// Failures from the server's local integrations.
///
/// These are reported back to the requesting peer as `Error` responses;
/// they never tear the connection down.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Clipboard read/write failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Launching the URI handler failed
    #[error("Failed to open URI: {0}")]
    Open(String),
}
