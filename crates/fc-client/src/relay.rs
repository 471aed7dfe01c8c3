//! One-shot HTTP file relay
//!
//! Serves exactly one local file to exactly one successful request, then
//! signals completion so the orchestrator can tear the listener down. A
//! real HTTP server is required rather than a raw socket: browsers also ask
//! for `/favicon.ico` and similar, and unanswered requests turn into
//! channel errors when SSH dynamic port forwarding is in play. Requests for
//! any other path are answered 404 and do not count as the fetch.
//!
//! Browsers aggressively cache previously seen URLs, and each relay
//! invocation serves a fresh ephemeral resource, so every response carries
//! headers forcing it to be treated as non-cacheable.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::resolver::ResolvedAddr;

/// Unix epoch as an HTTP date, used for `Expires` and `Last-Modified`
const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Per-session relay state
struct RelayState {
    /// File being served
    path: PathBuf,
    /// Base name requests must match
    basename: String,
    /// Completion signal, taken on first publish so it fires at most once
    served: Mutex<Option<oneshot::Sender<()>>>,
}

/// Handle to a running relay session
pub struct RelayHandle {
    url: String,
    served: oneshot::Receiver<()>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// URL the remote side should fetch
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait up to `timeout` for the file to be fetched, then shut the
    /// relay down.
    ///
    /// A timeout is a soft outcome: the remote open request already went
    /// through, so we log and move on. After a successful fetch the server
    /// is drained gracefully under the same bound, to avoid leaving a
    /// dangling forwarded port producing connection-refused noise on the
    /// tunnel.
    pub async fn finish(mut self, timeout: Duration) {
        match tokio::time::timeout(timeout, &mut self.served).await {
            Ok(_) => {
                tracing::debug!("File fetched, shutting relay down");
                self.cancel.cancel();
                if tokio::time::timeout(timeout, &mut self.task).await.is_err() {
                    tracing::debug!("Relay did not drain in time, aborting");
                    self.task.abort();
                }
            }
            Err(_) => {
                tracing::warn!("Timed out waiting for file request");
                self.cancel.cancel();
                self.task.abort();
            }
        }
    }
}

impl Drop for RelayHandle {
    /// Tear the relay down even when the handle never reaches `finish`,
    /// e.g. when the RPC call carrying the URL fails
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Start serving `path` at the resolved listen address.
///
/// Returns as soon as the listener is bound; the HTTP service runs on its
/// own task. Port 0 is allowed and resolves to an OS-assigned port, which
/// is reflected in the handle's URL.
pub async fn serve_file(path: &Path, resolved: &ResolvedAddr) -> Result<RelayHandle, ClientError> {
    let listener = TcpListener::bind(resolved.listen.as_str()).await?;
    let port = listener.local_addr()?.port();

    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let url = resolved.advertise_url(port, &basename);

    let (served_tx, served_rx) = oneshot::channel();
    let state = Arc::new(RelayState {
        path: path.to_path_buf(),
        basename,
        served: Mutex::new(Some(served_tx)),
    });

    let app = Router::new().fallback(serve_once).with_state(state);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned());
        if let Err(e) = serve.await {
            tracing::debug!("File relay exited: {}", e);
        }
    });

    Ok(RelayHandle {
        url,
        served: served_rx,
        cancel,
        task,
    })
}

/// Serve the session's file once; 404 anything else
async fn serve_once(State(state): State<Arc<RelayState>>, uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "Relay request");

    let requested = uri.path().rsplit('/').next().unwrap_or_default();
    if requested != state.basename {
        // Stray request (favicon probe or similar); answer it properly but
        // leave the session open.
        tracing::debug!("Not serving {}", uri.path());
        return (StatusCode::NOT_FOUND, "not serving").into_response();
    }

    // Conditional validators are never evaluated, so a cached ETag can
    // never turn the single fetch into a 304.
    let response = match tokio::fs::read(&state.path).await {
        Ok(bytes) => {
            tracing::debug!("Transferring file {:?}", state.path);
            let mime = mime_guess::from_path(&state.path).first_or_octet_stream();
            (
                [
                    ("content-type", mime.essence_str().to_string()),
                    ("expires", EPOCH_HTTP_DATE.to_string()),
                    ("cache-control", "no-cache, private, max-age=0".to_string()),
                    ("pragma", "no-cache".to_string()),
                    ("x-accel-expires", "0".to_string()),
                    ("last-modified", EPOCH_HTTP_DATE.to_string()),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            // The requester gets the error text; the orchestrator learns
            // only that the session is over.
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    };

    if let Ok(mut guard) = state.served.lock() {
        if let Some(tx) = guard.take() {
            let _ = tx.send(());
        }
    }

    response
}
