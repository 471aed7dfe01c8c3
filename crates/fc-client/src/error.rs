//! Client error types

use fc_protocol::{Message, ProtocolError};
use thiserror::Error;

/// Errors surfaced by the RPC client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not reach the server
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Protocol error on the wire
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Server closed the connection before answering
    #[error("Connection closed before a response arrived")]
    ConnectionClosed,

    /// Server answered with a message that doesn't fit the request
    #[error("Unexpected response: {0:?}")]
    UnexpectedResponse(Message),

    /// The server reported a failure
    #[error("Server error: {0}")]
    Remote(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
