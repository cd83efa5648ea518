//! WebSocket transport binding sockets to engine connections.
//!
//! Authentication happens upstream: the proxy in front of the listener sets
//! `x-user-id` on the upgrade request and the handshake is refused without it.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tidewatch_core::error::{AppError, ErrorKind};
use tidewatch_core::result::AppResult;
use tidewatch_core::types::UserId;

use crate::engine::RealtimeEngine;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Accepts WebSocket upgrades until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    engine: Arc<RealtimeEngine>,
    shutdown: CancellationToken,
) -> AppResult<()> {
    let local = listener.local_addr()?;
    info!(addr = %local, "WebSocket listener started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept TCP connection");
                        continue;
                    }
                };
                if !engine.is_running() {
                    debug!(peer = %peer, "Engine stopped, refusing connection");
                    continue;
                }
                let engine = engine.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_socket(stream, peer, engine, shutdown).await {
                        debug!(peer = %peer, error = %e, "WebSocket session ended with error");
                    }
                });
            }
        }
    }

    info!("WebSocket listener stopped");
    Ok(())
}

/// Reads the user id header off the upgrade request.
fn user_id_from(request: &Request) -> Option<UserId> {
    request
        .headers()
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn unauthorized() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(format!("missing or invalid {USER_ID_HEADER}")));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}

async fn handle_socket(
    stream: TcpStream,
    peer: SocketAddr,
    engine: Arc<RealtimeEngine>,
    shutdown: CancellationToken,
) -> AppResult<()> {
    let mut user_id = None;
    let callback = |request: &Request, response: Response| match user_id_from(request) {
        Some(id) => {
            user_id = Some(id);
            Ok(response)
        }
        None => Err(unauthorized()),
    };
    let socket = tokio_tungstenite::accept_hdr_async(stream, callback)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Validation, "WebSocket handshake failed", e))?;
    let Some(user_id) = user_id else {
        return Err(AppError::authorization("WebSocket handshake without user id"));
    };

    let (handle, mut outbound) = engine.connections.register(user_id);
    let conn_id = handle.id;
    debug!(conn_id = %conn_id, peer = %peer, "WebSocket session opened");

    let (mut sink, mut inbound) = socket.split();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = handle.closed() => break,
            frame = outbound.recv() => {
                let Some(text) = frame else { break };
                if let Err(e) = sink.send(Message::text(text)).await {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket write failed");
                    break;
                }
            }
            message = inbound.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    engine.connections.handle_inbound(&conn_id, text.as_str());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read failed");
                    break;
                }
            },
        }
    }

    engine.connections.unregister(&conn_id);
    let _ = sink.send(Message::Close(None)).await;
    debug!(conn_id = %conn_id, "WebSocket session closed");
    Ok(())
}
