//! Client-side command entry points
//!
//! `open` is the interesting one: when the argument names a file that
//! exists locally, the file is exposed through the one-shot relay and the
//! remote side is handed the relay URL instead of the original path.

use std::path::Path;

use anyhow::{Context, Result};

use fc_core::ClientConfig;

use crate::relay::{self, RelayHandle};
use crate::resolver::{self, TopologyHint};
use crate::rpc::RpcClient;

/// Open a URI (or a local file) on the remote side.
///
/// RPC failures are hard errors. A missed file-fetch confirmation is not:
/// by then the remote open already succeeded from the transport's point of
/// view, so the relay outcome is logged and absorbed.
pub async fn open(config: &ClientConfig, uri: &str) -> Result<()> {
    let mut uri = uri.to_string();
    let mut session: Option<RelayHandle> = None;

    if config.transfer_local_file && Path::new(&uri).exists() {
        let hint = TopologyHint::detect().await;
        let resolved = resolver::resolve(config.transfer_port, config.translate_loopback, &hint);
        tracing::debug!(
            listen = %resolved.listen,
            host = %resolved.advertise_host,
            "Relaying local file"
        );

        let handle = relay::serve_file(Path::new(&uri), &resolved)
            .await
            .context("Failed to start file relay")?;
        uri = handle.url().to_string();
        session = Some(handle);
    }

    let mut client = RpcClient::connect(&config.host, config.port).await?;
    tracing::debug!(uri = %uri, "Sending open request");
    client.open(&uri, config.translate_loopback).await?;

    if let Some(handle) = session {
        handle.finish(config.transfer_timeout).await;
    }

    Ok(())
}

/// Send `text` to the remote clipboard
pub async fn copy(config: &ClientConfig, text: &str) -> Result<()> {
    let mut client = RpcClient::connect(&config.host, config.port).await?;
    tracing::debug!(len = text.len(), "Sending copy request");
    client.copy(text).await?;
    Ok(())
}

/// Fetch the remote clipboard content, normalized to the local line-ending
/// policy
pub async fn paste(config: &ClientConfig) -> Result<String> {
    let mut client = RpcClient::connect(&config.host, config.port).await?;
    let text = client.paste().await?;
    tracing::debug!(len = text.len(), "Received paste response");
    Ok(config.line_ending.convert(&text))
}
