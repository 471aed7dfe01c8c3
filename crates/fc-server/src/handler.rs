//! Per-connection request handler
//!
//! Each admitted connection gets its own handler owning the peer's address,
//! so "which peer asked" is answered by construction rather than by any
//! shared hand-off between the accept loop and the dispatch layer. Requests
//! on one connection are serviced strictly in order.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use fc_protocol::{Message, MessageCodec, ProtocolError};

use crate::error::ServerError;
use crate::gate::Server;
use crate::translate;

/// Handler for a single admitted connection
pub struct ConnectionHandler {
    /// Address of the connected peer
    peer_addr: SocketAddr,
    /// Shared server state (allow-list already applied)
    server: Arc<Server>,
}

impl ConnectionHandler {
    /// Create a handler bound to one peer
    pub(crate) fn new(peer_addr: SocketAddr, server: Arc<Server>) -> Self {
        Self { peer_addr, server }
    }

    /// Drive the request/response loop until the peer disconnects
    pub(crate) async fn run(self, socket: TcpStream) -> Result<(), ProtocolError> {
        let mut framed = Framed::new(socket, MessageCodec::new());

        while let Some(request) = framed.next().await {
            let response = self.dispatch(request?).await;
            framed.send(response).await?;
        }

        Ok(())
    }

    /// Service one request, producing its response
    async fn dispatch(&self, request: Message) -> Message {
        match request {
            Message::Open {
                uri,
                translate_loopback,
            } => {
                let uri = if translate_loopback {
                    translate::translate_loopback(&uri, self.peer_addr.ip())
                } else {
                    uri
                };
                tracing::debug!(uri = %uri, peer = %self.peer_addr, "Open request");

                let opener = Arc::clone(&self.server.opener);
                Self::respond(
                    tokio::task::spawn_blocking(move || opener.open(&uri)).await,
                )
            }

            Message::Copy { text } => {
                tracing::debug!(len = text.len(), peer = %self.peer_addr, "Copy request");
                let normalized = self.server.line_ending().convert(&text);

                let clipboard = Arc::clone(&self.server.clipboard);
                Self::respond(
                    tokio::task::spawn_blocking(move || clipboard.set(&normalized)).await,
                )
            }

            Message::Paste => {
                tracing::debug!(peer = %self.peer_addr, "Paste request");

                let clipboard = Arc::clone(&self.server.clipboard);
                match tokio::task::spawn_blocking(move || clipboard.get()).await {
                    Ok(Ok(text)) => Message::PasteText { text },
                    Ok(Err(e)) => Message::Error {
                        message: e.to_string(),
                    },
                    Err(e) => Message::Error {
                        message: format!("clipboard task failed: {}", e),
                    },
                }
            }

            other => {
                tracing::warn!(peer = %self.peer_addr, "Unexpected message: {:?}", other);
                Message::Error {
                    message: "unexpected message".to_string(),
                }
            }
        }
    }

    /// Map a blocking-task outcome to an RPC response
    fn respond(result: Result<Result<(), ServerError>, tokio::task::JoinError>) -> Message {
        match result {
            Ok(Ok(())) => Message::Ok,
            Ok(Err(e)) => Message::Error {
                message: e.to_string(),
            },
            Err(e) => Message::Error {
                message: format!("task failed: {}", e),
            },
        }
    }
}
