//! RPC client
//!
//! One framed TCP connection, strict request/response alternation. The
//! transport is expected to be wrapped in something that provides secrecy
//! (typically SSH port forwarding); nothing here is encrypted.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use fc_protocol::{Message, MessageCodec};

use crate::error::ClientError;

/// Client for the farclip RPC channel
pub struct RpcClient {
    framed: Framed<TcpStream, MessageCodec>,
}

impl RpcClient {
    /// Dial the server and set up framing
    pub async fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        let addr = format!("{}:{}", host, port);
        tracing::debug!("Connecting to {}", addr);

        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| ClientError::Connect { addr, source })?;

        Ok(Self {
            framed: Framed::new(stream, MessageCodec::new()),
        })
    }

    /// Send one request and wait for its response.
    ///
    /// A remote `Error` response is mapped to `ClientError::Remote` so
    /// callers see exactly one failure path for "the server said no".
    pub async fn call(&mut self, request: Message) -> Result<Message, ClientError> {
        self.framed.send(request).await?;

        match self.framed.next().await {
            Some(Ok(Message::Error { message })) => Err(ClientError::Remote(message)),
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(e.into()),
            None => Err(ClientError::ConnectionClosed),
        }
    }

    /// Ask the server to open `uri`
    pub async fn open(&mut self, uri: &str, translate_loopback: bool) -> Result<(), ClientError> {
        let response = self
            .call(Message::Open {
                uri: uri.to_string(),
                translate_loopback,
            })
            .await?;
        match response {
            Message::Ok => Ok(()),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }

    /// Replace the server clipboard with `text`
    pub async fn copy(&mut self, text: &str) -> Result<(), ClientError> {
        let response = self
            .call(Message::Copy {
                text: text.to_string(),
            })
            .await?;
        match response {
            Message::Ok => Ok(()),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }

    /// Fetch the server clipboard content
    pub async fn paste(&mut self) -> Result<String, ClientError> {
        let response = self.call(Message::Paste).await?;
        match response {
            Message::PasteText { text } => Ok(text),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }
}
