//! Configuration management for farclip
//!
//! Values live in a TOML file with `[client]` and `[server]` sections.
//! Every field has a default, so a missing file or an empty section is
//! valid. Command-line flags override file values at the binary level.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::line_ending::LineEnding;

/// Default RPC port, shared by client and server
pub const DEFAULT_PORT: u16 = 2489;

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("farclip")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Client-side settings
    pub client: ClientConfig,
    /// Server-side settings
    pub server: ServerConfig,
}

/// Configuration for the client (copy/paste/open commands)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Destination host to dial
    pub host: String,

    /// Destination RPC port
    pub port: u16,

    /// Line-ending conversion applied to pasted text
    pub line_ending: LineEnding,

    /// Ask the server to rewrite loopback hosts in opened URIs
    pub translate_loopback: bool,

    /// Serve local files over HTTP when opening a path that exists locally
    pub transfer_local_file: bool,

    /// Port for the one-shot file relay (0 = ephemeral)
    pub transfer_port: u16,

    /// How long to wait for the remote side to fetch a relayed file
    #[serde(with = "duration_secs")]
    pub transfer_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            line_ending: LineEnding::Passthrough,
            translate_loopback: true,
            transfer_local_file: true,
            transfer_port: 0,
            transfer_timeout: Duration::from_secs(1),
        }
    }
}

/// Configuration for the server daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,

    /// Comma-separated CIDR ranges admitted to the service
    pub allow: String,

    /// Line-ending conversion applied to copied text
    pub line_ending: LineEnding,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allow: "0.0.0.0/0,::/0".to_string(),
            line_ending: LineEnding::Passthrough,
        }
    }
}

impl ServerConfig {
    /// Get the bind address (all interfaces)
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

// Helper module serializing Durations as whole seconds
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
