//! fc-protocol: Wire protocol for the farclip RPC channel
//!
//! This crate defines the binary protocol spoken between the farclip client
//! and server over a TCP connection (usually one forwarded through SSH).

pub mod codec;
pub mod error;
pub mod frame;
pub mod message;

pub use codec::MessageCodec;
pub use error::ProtocolError;
pub use frame::{FrameHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use message::{Message, MessageType};
