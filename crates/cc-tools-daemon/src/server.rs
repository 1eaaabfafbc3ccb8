//! Listener lifecycle and per-connection loop for the Unix-socket
//! JSON-RPC server (spec.md §4.2).
//!
//! One task runs the accept loop; each accepted connection gets its own
//! task. All I/O to a given connection is serialized within that task  --
//! there is never a concurrent write to the same socket. Shutdown is
//! cooperative: a broadcast channel signals every live task, and a
//! `Notify`-backed counter bounds how long the listener waits for them to
//! drain before proceeding with cleanup regardless.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, Notify};

use cc_tools_core::capabilities::Capabilities;
use cc_tools_core::rpc::codec::{self, Decoder};
use cc_tools_core::rpc::{error_codes, Response};
use cc_tools_core::stats::Stats;

use crate::dispatch::Dispatcher;

const READ_DEADLINE: Duration = Duration::from_secs(30);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Tracks live connection tasks so shutdown can wait (briefly) for them.
#[derive(Default)]
struct WaitGroup {
    count: AtomicUsize,
    drained: Notify,
}

impl WaitGroup {
    fn inc(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn dec(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    async fn wait_drained(&self) {
        while self.count.load(Ordering::SeqCst) > 0 {
            self.drained.notified().await;
        }
    }
}

/// Create the socket's parent directory (mode 0700), remove any stale
/// socket file, bind, and `chmod` to 0600.
fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
        }
    }
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(listener)
}

/// Run the server until a shutdown signal (SIGINT/SIGTERM) arrives.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound.
pub async fn run(socket_path: PathBuf, caps: Capabilities) -> anyhow::Result<()> {
    let listener = bind(&socket_path)?;
    tracing::info!(socket = %socket_path.display(), "listening on unix socket");

    let stats = Arc::new(Stats::new(&*caps.clock));
    let dispatcher = Arc::new(Dispatcher::new(
        caps,
        Arc::new(cc_tools_core::lock::MemoryLockManager::new()),
        Arc::clone(&stats),
        socket_path.display().to_string(),
    ));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let wait_group = Arc::new(WaitGroup::default());

    tokio::spawn(wait_for_signal(shutdown_tx.clone()));

    loop {
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown signal received, stopping accept loop");
                break;
            }
            accepted = listener.accept() => {
                let (stream, _addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                stats.connection_opened();
                wait_group.inc();
                let dispatcher = Arc::clone(&dispatcher);
                let stats = Arc::clone(&stats);
                let wait_group = Arc::clone(&wait_group);
                let shutdown_rx = shutdown_tx.subscribe();
                tokio::spawn(async move {
                    handle_connection(stream, dispatcher, shutdown_rx).await;
                    stats.connection_closed();
                    wait_group.dec();
                });
            }
        }
    }

    drop(listener);
    match tokio::time::timeout(SHUTDOWN_GRACE, wait_group.wait_drained()).await {
        Ok(()) => tracing::info!("all connections drained"),
        Err(_) => tracing::warn!("shutdown grace period elapsed with connections still open"),
    }

    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal(shutdown_tx: broadcast::Sender<()>) {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
    }
    let _ = shutdown_tx.send(());
}

#[cfg(not(unix))]
async fn wait_for_signal(shutdown_tx: broadcast::Sender<()>) {
    let _ = tokio::signal::ctrl_c().await;
    let _ = shutdown_tx.send(());
}

/// Per-connection loop (spec.md §4.2 step list):
/// 1. Check shutdown. 2. 30s read deadline. 3. Decode one request (EOF/
/// timeout returns cleanly; a malformed line sends `ParseError` or
/// `InvalidRequest`, whichever fits, and closes).
/// 4. Increment request counter (done in `Dispatcher::handle`).
/// 5. Dispatch, always responding before looping.
async fn handle_connection(
    stream: UnixStream,
    dispatcher: Arc<Dispatcher>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut decoder = Decoder::new(BufReader::new(read_half));

    loop {
        if shutdown_rx.try_recv().is_ok() {
            return;
        }

        let decoded = tokio::time::timeout(READ_DEADLINE, decoder.next_request()).await;

        let decoded = match decoded {
            Ok(Ok(d)) => d,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "connection read error");
                return;
            }
            Err(_elapsed) => {
                // Read deadline exceeded; treat as a clean disconnect, not
                // an error, and let the client reconnect if it wants to.
                return;
            }
        };

        use cc_tools_core::rpc::codec::Decoded;
        let response = match decoded {
            Decoded::Eof => return,
            Decoded::Malformed(e) => {
                // A bad `jsonrpc` value is a well-formed-but-invalid Request
                // (−32600); anything else means the line itself wasn't even
                // valid JSON (−32700). These use distinct codes per the
                // JSON-RPC 2.0 spec, so they can't share one branch.
                let (code, message) = match e {
                    cc_tools_core::error::CodecError::InvalidRequest => {
                        (error_codes::INVALID_REQUEST, "Invalid Request")
                    }
                    _ => (error_codes::PARSE_ERROR, "Parse error"),
                };
                let resp =
                    Response::error(cc_tools_core::rpc::RequestId::default(), code, message);
                let _ = send(&mut write_half, &resp).await;
                return;
            }
            Decoded::Request(req) => dispatcher.handle(req).await,
        };

        if send(&mut write_half, &response).await.is_err() {
            return;
        }
    }
}

async fn send(
    write_half: &mut tokio::net::unix::OwnedWriteHalf,
    response: &Response,
) -> std::io::Result<()> {
    let encoded = codec::encode_response(response)
        .map_err(|e| std::io::Error::other(format!("encode failure: {e}")))?;
    write_half.write_all(encoded.as_bytes()).await?;
    write_half.flush().await
}
