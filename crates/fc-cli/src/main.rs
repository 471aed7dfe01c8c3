//! farclip CLI
//!
//! Single binary for both ends of the link:
//! - `server` runs on the machine with the browser and the clipboard
//! - `copy` / `paste` / `open` run on the initiating machine
//!
//! Installing the binary under the names `pbcopy`, `pbpaste`, or
//! `xdg-open` (symlinks work) makes the matching subcommand implicit, so
//! existing tooling that shells out to those commands transparently talks
//! to the remote side.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fc_core::config::{self, ConfigFile};
use fc_core::{AllowList, ClientConfig, LineEnding, ServerConfig};
use fc_server::Server;

#[derive(Parser)]
#[command(name = "farclip")]
#[command(author, version, about = "Copy, paste and open browser across machines over TCP")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Destination host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// TCP port (overrides config)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Line-ending conversion (lf/crlf)
    #[arg(long, global = true)]
    line_ending: Option<LineEnding>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send text to the server clipboard (reads stdin if no text given)
    Copy {
        /// Text to copy
        text: Option<String>,
    },

    /// Print the server clipboard content
    Paste,

    /// Open a URL or local file in the server's default browser
    Open {
        /// URL or local file path (reads stdin if omitted)
        uri: Option<String>,

        /// Don't rewrite loopback addresses on the server side
        #[arg(long)]
        no_translate_loopback: bool,

        /// Don't serve local files over the one-shot relay
        #[arg(long)]
        no_transfer_localfile: bool,

        /// Port for the file relay (0 = ephemeral)
        #[arg(long)]
        transfer_port: Option<u16>,

        /// Seconds to wait for the file to be fetched
        #[arg(long)]
        transfer_timeout: Option<u64>,
    },

    /// Start the server
    Server {
        /// Allowed peer ranges, comma-separated CIDR
        #[arg(long)]
        allow: Option<String>,
    },
}

/// Map an invocation name to an implicit subcommand
fn alias_subcommand(argv0: &Path) -> Option<&'static str> {
    match argv0.file_stem()?.to_str()? {
        "xdg-open" => Some("open"),
        "pbcopy" => Some("copy"),
        "pbpaste" => Some("paste"),
        _ => None,
    }
}

/// Process arguments, inserting the aliased subcommand when the binary was
/// invoked under a well-known name
fn effective_args() -> Vec<OsString> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if let Some(argv0) = args.first() {
        if let Some(subcommand) = alias_subcommand(Path::new(argv0)) {
            args.insert(1, subcommand.into());
        }
    }
    args
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(effective_args());

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_file = load_config_file(cli.config.as_ref())?;
    let mut client = merge_client(config_file.client, &cli);

    match cli.command {
        Commands::Copy { text } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin().await?,
            };
            fc_client::copy(&client, &text).await?;
        }

        Commands::Paste => {
            let text = fc_client::paste(&client).await?;
            print!("{}", text);
            std::io::stdout().flush()?;
        }

        Commands::Open {
            uri,
            no_translate_loopback,
            no_transfer_localfile,
            transfer_port,
            transfer_timeout,
        } => {
            if no_translate_loopback {
                client.translate_loopback = false;
            }
            if no_transfer_localfile {
                client.transfer_local_file = false;
            }
            if let Some(port) = transfer_port {
                client.transfer_port = port;
            }
            if let Some(secs) = transfer_timeout {
                client.transfer_timeout = std::time::Duration::from_secs(secs);
            }

            let uri = match uri {
                Some(uri) => uri,
                None => read_stdin().await?.trim().to_string(),
            };
            anyhow::ensure!(!uri.is_empty(), "no URI given");

            fc_client::open(&client, &uri).await?;
        }

        Commands::Server { allow } => {
            let mut server = config_file.server;
            if let Some(port) = cli.port {
                server.port = port;
            }
            if let Some(line_ending) = cli.line_ending {
                server.line_ending = line_ending;
            }
            if let Some(allow) = allow {
                server.allow = allow;
            }
            run_server(server).await?;
        }
    }

    Ok(())
}

/// Load the config file: an explicitly given path must parse, the default
/// path is best-effort
fn load_config_file(path: Option<&PathBuf>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        match config::load_config(&default_path) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                Ok(ConfigFile::default())
            }
        }
    } else {
        Ok(ConfigFile::default())
    }
}

/// Apply global flag overrides to the client config
fn merge_client(mut client: ClientConfig, cli: &Cli) -> ClientConfig {
    if let Some(host) = &cli.host {
        client.host = host.clone();
    }
    if let Some(port) = cli.port {
        client.port = port;
    }
    if let Some(line_ending) = cli.line_ending {
        client.line_ending = line_ending;
    }
    client
}

async fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read stdin")?;
    Ok(buf)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let allow = AllowList::parse(&config.allow)
        .with_context(|| format!("Invalid allow list '{}'", config.allow))?;

    let cancel = CancellationToken::new();

    // Setup signal handlers
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    let server = Arc::new(Server::with_system_integrations(
        allow,
        config.line_ending,
        cancel,
    ));
    server.run(listener).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_detection() {
        assert_eq!(alias_subcommand(Path::new("xdg-open")), Some("open"));
        assert_eq!(
            alias_subcommand(Path::new("/usr/bin/xdg-open")),
            Some("open")
        );
        assert_eq!(alias_subcommand(Path::new("pbcopy")), Some("copy"));
        assert_eq!(alias_subcommand(Path::new("pbpaste.exe")), Some("paste"));
        assert_eq!(alias_subcommand(Path::new("farclip")), None);
        assert_eq!(alias_subcommand(Path::new("/usr/local/bin/farclip")), None);
    }

    #[test]
    fn test_merge_client_overrides() {
        let cli = Cli::parse_from(["farclip", "--host", "devbox", "-p", "9999", "paste"]);
        let merged = merge_client(ClientConfig::default(), &cli);
        assert_eq!(merged.host, "devbox");
        assert_eq!(merged.port, 9999);
        // Untouched fields keep their config values
        assert!(merged.translate_loopback);
    }

    #[test]
    fn test_line_ending_flag_parses() {
        let cli = Cli::parse_from(["farclip", "--line-ending", "crlf", "paste"]);
        assert_eq!(cli.line_ending, Some(LineEnding::Crlf));

        let result = Cli::try_parse_from(["farclip", "--line-ending", "cr", "paste"]);
        assert!(result.is_err());
    }
}
