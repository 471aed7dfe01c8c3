//! fc-client: the initiator side of farclip
//!
//! Provides the RPC client plus the machinery behind the `open` command:
//! picking a reachable listen/advertise address for this machine and
//! serving a single local file over a one-shot HTTP relay so a browser on
//! the remote end can fetch it.

pub mod commands;
pub mod error;
pub mod relay;
pub mod resolver;
pub mod rpc;

pub use commands::{copy, open, paste};
pub use error::ClientError;
pub use relay::RelayHandle;
pub use resolver::{resolve, ResolvedAddr, TopologyHint};
pub use rpc::RpcClient;
