//! fc-core: Shared configuration and policy types for farclip
//!
//! This crate provides the pieces both ends of the link need: the TOML
//! configuration surface, the peer allow-list, and line-ending
//! normalization.

pub mod allowlist;
pub mod config;
pub mod error;
pub mod line_ending;

pub use allowlist::AllowList;
pub use config::{ClientConfig, ConfigFile, ServerConfig};
pub use error::ConfigError;
pub use line_ending::LineEnding;
