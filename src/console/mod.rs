//! WebSocket command relay.
//!
//! Accepts connections on one TCP port, serves each in its own task, and
//! dispatches the JSON envelope against the managed browser. A plain HTTP
//! `GET /health` on the same port is answered with a JSON status document
//! so clients can probe liveness without a WebSocket library.

pub mod protocol;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::browser::BrowserManager;
use crate::config::ConsoleConfig;
use crate::sanitizer::Sanitizer;

use protocol::{ConsoleRequest, ConsoleResponse};

/// Shared state handed to every connection task.
pub struct ConsoleContext {
    pub browser: BrowserManager,
    pub sanitizer: Sanitizer,
    started_at: Instant,
}

impl ConsoleContext {
    /// Build the context for a configuration.
    #[must_use]
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            browser: BrowserManager::new(config.clone()),
            sanitizer: config.sanitizer(),
            started_at: Instant::now(),
        }
    }
}

/// Run the relay until a shutdown signal arrives.
///
/// Binds the listener, serves connections in spawned tasks, and closes the
/// browser before returning.
pub async fn run(config: ConsoleConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Console listening (WebSocket + HTTP health on same port)");

    let ctx = Arc::new(ConsoleContext::new(&config));

    // Graceful shutdown: resolve on SIGTERM (Unix) or Ctrl-C (all platforms).
    let shutdown = make_shutdown_future();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown signal received - closing browser and stopping");
                if let Err(e) = ctx.browser.shutdown().await {
                    warn!("Browser shutdown failed: {e}");
                }
                break;
            }

            conn = listener.accept() => {
                let (stream, peer) = match conn {
                    Ok(c) => c,
                    Err(e) => {
                        error!(err = %e, "accept error");
                        continue;
                    }
                };
                debug!(peer = %peer, "new connection");
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, ctx).await {
                        warn!(peer = %peer, err = %e, "connection error");
                    }
                });
            }
        }
    }

    info!("Console stopped");
    Ok(())
}

/// Returns a future that resolves when a shutdown signal is received.
async fn make_shutdown_future() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, ctx: Arc<ConsoleContext>) -> Result<()> {
    // Both the WS handshake and a health probe start with "GET "; peek for
    // the health path specifically and let everything else go through the
    // normal WebSocket handshake.
    let mut peek_buf = [0u8; 12];
    let n = stream.peek(&mut peek_buf).await.unwrap_or(0);
    if n >= 11 && &peek_buf[..11] == b"GET /health" {
        return handle_health_check(stream, &ctx).await;
    }

    let ws = accept_async(stream).await?;
    let (mut sink, mut stream) = ws.split();

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = dispatch_text(text.as_str(), &ctx).await;
                if let Err(e) = sink.send(Message::Text(response.into())).await {
                    warn!(err = %e, "send error");
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = sink.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(err = %e, "ws error");
                break;
            }
            _ => {}
        }
    }

    debug!("connection closed");
    Ok(())
}

/// Respond to an HTTP `GET /health` request with a JSON status document.
async fn handle_health_check(
    mut stream: tokio::net::TcpStream,
    ctx: &ConsoleContext,
) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Consume the request; any GET /health is fine.
    let mut req_buf = vec![0u8; 2048];
    let _ = stream.read(&mut req_buf).await;

    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime": ctx.started_at.elapsed().as_secs(),
    });
    let body_str = body.to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body_str.len(),
        body_str
    );
    stream.write_all(response.as_bytes()).await?;
    Ok(())
}

/// Turn one incoming text frame into the reply to send back.
///
/// Every frame gets a reply, including unparseable ones and unknown
/// actions - a caller awaiting a response must never be left hanging.
pub(crate) async fn dispatch_text(text: &str, ctx: &ConsoleContext) -> String {
    let request = match serde_json::from_str::<ConsoleRequest>(text) {
        Ok(r) => r,
        Err(e) => {
            debug!("rejecting request: {e}");
            return ConsoleResponse::failure(format!("invalid request: {e}")).to_json();
        }
    };

    debug!(?request, "dispatch");

    let outcome = match request {
        ConsoleRequest::ExecuteCode { code } => ctx.browser.execute_code(&code).await,
        ConsoleRequest::FetchHtml => {
            ctx.browser.snapshot_markup().await.and_then(|raw| {
                let clean = ctx.sanitizer.sanitize(&raw)?;
                Ok(Value::String(clean))
            })
        }
    };

    match outcome {
        Ok(value) => ConsoleResponse::ok(value),
        Err(e) => {
            warn!("request failed: {e}");
            ConsoleResponse::failure(e.to_string())
        }
    }
    .to_json()
}
