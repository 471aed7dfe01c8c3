//! Server integration tests
//!
//! Drives a real gate + handler over loopback TCP with in-memory clipboard
//! and opener implementations, using the fc-client RPC client as the peer.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use fc_client::{ClientError, RpcClient};
use fc_core::{AllowList, LineEnding};
use fc_server::{Clipboard, Server, ServerError, UriOpener};

#[derive(Default)]
struct MemoryClipboard {
    text: Mutex<String>,
}

impl Clipboard for MemoryClipboard {
    fn get(&self) -> Result<String, ServerError> {
        Ok(self.text.lock().unwrap().clone())
    }

    fn set(&self, text: &str) -> Result<(), ServerError> {
        *self.text.lock().unwrap() = text.to_string();
        Ok(())
    }
}

struct FailingClipboard;

impl Clipboard for FailingClipboard {
    fn get(&self) -> Result<String, ServerError> {
        Err(ServerError::Clipboard("no display".to_string()))
    }

    fn set(&self, _text: &str) -> Result<(), ServerError> {
        Err(ServerError::Clipboard("no display".to_string()))
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl UriOpener for RecordingOpener {
    fn open(&self, uri: &str) -> Result<(), ServerError> {
        self.opened.lock().unwrap().push(uri.to_string());
        Ok(())
    }
}

async fn start_server(
    allow: &str,
    line_ending: LineEnding,
    clipboard: Arc<dyn Clipboard>,
    opener: Arc<dyn UriOpener>,
) -> (SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let server = Arc::new(Server::new(
        AllowList::parse(allow).unwrap(),
        line_ending,
        clipboard,
        opener,
        cancel.clone(),
    ));
    tokio::spawn(server.run(listener));

    (addr, cancel)
}

#[tokio::test]
async fn test_copy_then_paste_roundtrip() {
    let clipboard = Arc::new(MemoryClipboard::default());
    let (addr, cancel) = start_server(
        "127.0.0.1",
        LineEnding::Lf,
        clipboard.clone(),
        Arc::new(RecordingOpener::default()),
    )
    .await;

    let mut client = RpcClient::connect("127.0.0.1", addr.port()).await.unwrap();
    client.copy("hello\r\nworld").await.unwrap();

    // Server normalized the text on the way in
    assert_eq!(clipboard.get().unwrap(), "hello\nworld");
    assert_eq!(client.paste().await.unwrap(), "hello\nworld");

    cancel.cancel();
}

#[tokio::test]
async fn test_multiple_requests_on_one_connection() {
    let (addr, cancel) = start_server(
        "127.0.0.1",
        LineEnding::Passthrough,
        Arc::new(MemoryClipboard::default()),
        Arc::new(RecordingOpener::default()),
    )
    .await;

    let mut client = RpcClient::connect("127.0.0.1", addr.port()).await.unwrap();
    client.copy("first").await.unwrap();
    assert_eq!(client.paste().await.unwrap(), "first");
    client.copy("second").await.unwrap();
    assert_eq!(client.paste().await.unwrap(), "second");

    cancel.cancel();
}

#[tokio::test]
async fn test_open_dispatches_to_opener() {
    let opener = Arc::new(RecordingOpener::default());
    let (addr, cancel) = start_server(
        "127.0.0.1",
        LineEnding::Passthrough,
        Arc::new(MemoryClipboard::default()),
        opener.clone(),
    )
    .await;

    let mut client = RpcClient::connect("127.0.0.1", addr.port()).await.unwrap();

    // Non-loopback host: translation requested but nothing to rewrite
    client
        .open("http://192.168.0.9:4242/page", true)
        .await
        .unwrap();
    // Translation not requested: loopback host stays put
    client.open("http://127.0.0.1:4242/page", false).await.unwrap();

    let opened = opener.opened.lock().unwrap();
    assert_eq!(
        *opened,
        vec![
            "http://192.168.0.9:4242/page".to_string(),
            "http://127.0.0.1:4242/page".to_string(),
        ]
    );

    cancel.cancel();
}

#[tokio::test]
async fn test_rejected_peer_gets_no_bytes() {
    let (addr, cancel) = start_server(
        "203.0.113.0/24",
        LineEnding::Passthrough,
        Arc::new(MemoryClipboard::default()),
        Arc::new(RecordingOpener::default()),
    )
    .await;

    // Connection completes at the TCP level, then closes with zero bytes
    // of service traffic.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut buf = [0u8; 16];
    let n = stream.read(&mut buf).await.unwrap();
    assert_eq!(n, 0);

    // The RPC client sees the same thing as a closed connection
    let mut client = RpcClient::connect("127.0.0.1", addr.port()).await.unwrap();
    let result = client.paste().await;
    assert!(matches!(
        result,
        Err(ClientError::ConnectionClosed) | Err(ClientError::Io(_)) | Err(ClientError::Protocol(_))
    ));

    cancel.cancel();
}

#[tokio::test]
async fn test_clipboard_failure_surfaces_as_remote_error() {
    let (addr, cancel) = start_server(
        "127.0.0.1",
        LineEnding::Passthrough,
        Arc::new(FailingClipboard),
        Arc::new(RecordingOpener::default()),
    )
    .await;

    let mut client = RpcClient::connect("127.0.0.1", addr.port()).await.unwrap();
    match client.paste().await {
        Err(ClientError::Remote(message)) => assert!(message.contains("no display")),
        other => panic!("expected remote error, got {:?}", other),
    }

    // The connection survives the failed request
    match client.copy("still alive").await {
        Err(ClientError::Remote(_)) => {}
        other => panic!("expected remote error, got {:?}", other),
    }

    cancel.cancel();
}
