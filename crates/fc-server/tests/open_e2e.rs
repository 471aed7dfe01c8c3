//! End-to-end open tests: client orchestration against a live server
//!
//! The capturing opener plays the part of the remote browser: it hands the
//! URI it was asked to open to the test, which then performs the HTTP
//! fetch the browser would.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use fc_core::{AllowList, ClientConfig, LineEnding};
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

/// Opener that forwards the requested URI to the test instead of launching
/// anything
struct ChannelOpener(mpsc::UnboundedSender<String>);

impl UriOpener for ChannelOpener {
    fn open(&self, uri: &str) -> Result<(), ServerError> {
        let _ = self.0.send(uri.to_string());
        Ok(())
    }
}

async fn start_server(opener: Arc<dyn UriOpener>) -> (u16, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let cancel = CancellationToken::new();

    let server = Arc::new(Server::new(
        AllowList::parse("127.0.0.1").unwrap(),
        LineEnding::Passthrough,
        Arc::new(MemoryClipboard::default()),
        opener,
        cancel.clone(),
    ));
    tokio::spawn(server.run(listener));

    (port, cancel)
}

fn client_config(port: u16) -> ClientConfig {
    ClientConfig {
        host: "127.0.0.1".to_string(),
        port,
        transfer_timeout: Duration::from_secs(10),
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn test_open_local_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, b"%PDF-1.4 fake report").unwrap();

    let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
    let (port, cancel) = start_server(Arc::new(ChannelOpener(opened_tx))).await;
    let config = client_config(port);

    let open_fut = fc_client::open(&config, path.to_str().unwrap());

    // Play the remote browser: wait for the Open request, then fetch
    let fetch_fut = async {
        let uri = opened_rx.recv().await.expect("opener was not invoked");

        // The advertised loopback host was rewritten to the peer address
        // (which is loopback again in this test, but must be an IP literal)
        assert!(uri.starts_with("http://127.0.0.1:"), "got {}", uri);
        assert!(uri.ends_with("/report.pdf"), "got {}", uri);

        let response = reqwest::get(&uri).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["cache-control"],
            "no-cache, private, max-age=0"
        );
        assert_eq!(
            response.bytes().await.unwrap().as_ref(),
            b"%PDF-1.4 fake report"
        );
    };

    let (open_result, ()) = tokio::join!(open_fut, fetch_fut);
    open_result.unwrap();

    cancel.cancel();
}

#[tokio::test]
async fn test_open_plain_url_skips_relay() {
    let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
    let (port, cancel) = start_server(Arc::new(ChannelOpener(opened_tx))).await;
    let config = client_config(port);

    fc_client::open(&config, "https://example.com/docs")
        .await
        .unwrap();

    // Not a local file: the URI travels unchanged (non-loopback host, so
    // translation leaves it alone too)
    assert_eq!(
        opened_rx.recv().await.unwrap(),
        "https://example.com/docs"
    );

    cancel.cancel();
}

#[tokio::test]
async fn test_open_missing_file_is_treated_as_uri() {
    let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
    let (port, cancel) = start_server(Arc::new(ChannelOpener(opened_tx))).await;
    let config = client_config(port);

    fc_client::open(&config, "/no/such/file.txt").await.unwrap();

    assert_eq!(opened_rx.recv().await.unwrap(), "/no/such/file.txt");

    cancel.cancel();
}

#[tokio::test]
async fn test_open_fetch_timeout_is_soft() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-fetched.txt");
    std::fs::write(&path, b"nobody asks for this").unwrap();

    let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
    let (port, cancel) = start_server(Arc::new(ChannelOpener(opened_tx))).await;

    let config = ClientConfig {
        transfer_timeout: Duration::from_millis(100),
        ..client_config(port)
    };

    // The remote open succeeded; nobody ever fetches the file. The call
    // must still return Ok after the bounded wait.
    fc_client::open(&config, path.to_str().unwrap())
        .await
        .unwrap();

    let uri = opened_rx.recv().await.unwrap();
    assert!(uri.ends_with("/never-fetched.txt"));

    cancel.cancel();
}
