//! Clipboard seam
//!
//! The OS clipboard is reached through a trait so tests can substitute an
//! in-memory implementation. Calls are synchronous; the dispatch layer runs
//! them on the blocking pool.

use crate::error::ServerError;

/// Access to the clipboard on this machine
pub trait Clipboard: Send + Sync {
    /// Read the current clipboard text
    fn get(&self) -> Result<String, ServerError>;

    /// Replace the clipboard content with `text`
    fn set(&self, text: &str) -> Result<(), ServerError>;
}

/// OS clipboard via arboard.
///
/// A fresh arboard handle is opened per call; keeping one across calls
/// would pin the clipboard connection to a single thread, which doesn't
/// mix with the blocking pool.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn get(&self) -> Result<String, ServerError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ServerError::Clipboard(e.to_string()))?;
        clipboard
            .get_text()
            .map_err(|e| ServerError::Clipboard(e.to_string()))
    }

    fn set(&self, text: &str) -> Result<(), ServerError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ServerError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ServerError::Clipboard(e.to_string()))
    }
}
