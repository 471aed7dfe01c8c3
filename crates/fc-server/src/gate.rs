//! Connection gate
//!
//! Accepts inbound TCP connections and filters them through the allow-list.
//! Admitted connections get their own handler task carrying the peer's
//! address; rejected peers are dropped without a single byte written, so a
//! scanner learns nothing about the service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use fc_core::{AllowList, LineEnding};

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::handler::ConnectionHandler;
use crate::opener::{SystemOpener, UriOpener};

/// farclip server: allow-list gate plus request dispatch
pub struct Server {
    /// Admitted peer ranges, immutable after construction
    allow: AllowList,
    /// Line-ending policy applied to incoming copy text
    line_ending: LineEnding,
    /// Clipboard integration
    pub(crate) clipboard: Arc<dyn Clipboard>,
    /// URI opener integration
    pub(crate) opener: Arc<dyn UriOpener>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl Server {
    /// Create a server with explicit integrations (used by tests)
    pub fn new(
        allow: AllowList,
        line_ending: LineEnding,
        clipboard: Arc<dyn Clipboard>,
        opener: Arc<dyn UriOpener>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            allow,
            line_ending,
            clipboard,
            opener,
            cancel,
        }
    }

    /// Create a server wired to the OS clipboard and default URI handler
    pub fn with_system_integrations(
        allow: AllowList,
        line_ending: LineEnding,
        cancel: CancellationToken,
    ) -> Self {
        Self::new(
            allow,
            line_ending,
            Arc::new(SystemClipboard),
            Arc::new(SystemOpener),
            cancel,
        )
    }

    /// Line-ending policy for incoming copy text
    pub(crate) fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Run the accept loop until cancelled.
    ///
    /// An accept error is fatal: the listener is presumed unusable and the
    /// error propagates to the caller.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!("farclip server listening on {}", local_addr);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Server shutting down");
                    return Ok(());
                }

                result = listener.accept() => {
                    let (socket, peer_addr) = result.context("Accept failed")?;
                    Arc::clone(&self).handle_connection(socket, peer_addr);
                }
            }
        }
    }

    /// Filter and spawn a handler for one accepted connection
    fn handle_connection(self: Arc<Self>, socket: TcpStream, peer_addr: SocketAddr) {
        let cancel = self.cancel.clone();
        let server = self;

        tokio::spawn(async move {
            if !server.allow.contains(peer_addr.ip()) {
                // Fail closed: drop with no response, no information leak.
                tracing::debug!("Rejected connection from {}", peer_addr);
                return;
            }

            tracing::debug!("Serving connection from {}", peer_addr);
            let handler = ConnectionHandler::new(peer_addr, server);

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Connection handler cancelled for {}", peer_addr);
                }
                result = handler.run(socket) => {
                    match result {
                        Ok(()) => {
                            tracing::debug!("Connection from {} closed normally", peer_addr);
                        }
                        Err(e) => {
                            tracing::warn!("Connection from {} closed with error: {}", peer_addr, e);
                        }
                    }
                }
            }
        });
    }
}
