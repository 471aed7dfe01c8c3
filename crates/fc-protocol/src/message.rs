//! Message types for the farclip protocol
//!
//! One request travels per frame and is answered by exactly one response
//! frame on the same connection. Requests flow from the client to the
//! server; responses flow back. A single enum covers both directions so one
//! codec serves both ends.
//!
//! # Message Flow
//!
//! 1. Client connects and sends `Open`, `Copy`, or `Paste`
//! 2. Server answers `Ok` (for `Open`/`Copy`), `PasteText` (for `Paste`),
//!    or `Error`
//! 3. The client may issue further requests or close the connection

use serde::{Deserialize, Serialize};

/// Message type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Open a URI (or relayed file URL) on the server side
    Open = 0x01,
    /// Replace the server-side clipboard content
    Copy = 0x02,
    /// Request the server-side clipboard content
    Paste = 0x03,
    /// Success acknowledgment for `Open`/`Copy`
    Ok = 0x04,
    /// Clipboard content returned for `Paste`
    PasteText = 0x05,
    /// Error response
    Error = 0xFF,
}

impl MessageType {
    /// Convert to u8
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Open),
            0x02 => Some(Self::Copy),
            0x03 => Some(Self::Paste),
            0x04 => Some(Self::Ok),
            0x05 => Some(Self::PasteText),
            0xFF => Some(Self::Error),
            _ => None,
        }
    }
}

/// Protocol messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Ask the server to open a URI in its default handler.
    ///
    /// When `translate_loopback` is set the server rewrites a loopback host
    /// in the URI to the address of the peer that sent the request, so a URL
    /// built on the client side stays reachable from the server's network.
    Open {
        /// URI or opaque local path to open
        uri: String,
        /// Rewrite loopback hosts to the requesting peer's address
        translate_loopback: bool,
    },

    /// Replace the server clipboard with `text`
    Copy {
        /// Text to place on the clipboard
        text: String,
    },

    /// Request the server clipboard content
    Paste,

    /// Success acknowledgment (empty response)
    Ok,

    /// Clipboard content in response to `Paste`
    PasteText {
        /// Current clipboard text
        text: String,
    },

    /// Error response
    Error {
        /// Human-readable message
        message: String,
    },
}

impl Message {
    /// Get the message type for this message
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Open { .. } => MessageType::Open,
            Message::Copy { .. } => MessageType::Copy,
            Message::Paste => MessageType::Paste,
            Message::Ok => MessageType::Ok,
            Message::PasteText { .. } => MessageType::PasteText,
            Message::Error { .. } => MessageType::Error,
        }
    }

    /// Whether this message is a request (client to server)
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Message::Open { .. } | Message::Copy { .. } | Message::Paste
        )
    }
}
