//! URI opener seam

use crate::error::ServerError;

/// Launches a URI in this machine's default handler (browser, viewer, ...)
pub trait UriOpener: Send + Sync {
    /// Open `uri` with the platform's default application
    fn open(&self, uri: &str) -> Result<(), ServerError>;
}

/// Platform opener via the `open` crate
pub struct SystemOpener;

impl UriOpener for SystemOpener {
    fn open(&self, uri: &str) -> Result<(), ServerError> {
        open::that(uri).map_err(|e| ServerError::Open(e.to_string()))
    }
}
