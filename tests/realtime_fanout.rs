//! WebSocket fanout over a real socket.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use tidewatch_core::types::UserId;
use tidewatch_entity::Severity;
use tidewatch_entity::report::ReportType;
use tidewatch_realtime::ws::{self, USER_ID_HEADER};

use helpers::{TestApp, coast, ctx, north_of_coast, submission};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Server {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

async fn serve(app: &TestApp) -> Server {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(ws::serve(listener, app.engine.clone(), shutdown.clone()));
    Server { addr, shutdown }
}

async fn connect(addr: SocketAddr, user_id: Option<UserId>) -> Result<Client, String> {
    let mut request = format!("ws://{addr}/").into_client_request().unwrap();
    if let Some(id) = user_id {
        request
            .headers_mut()
            .insert(USER_ID_HEADER, id.to_string().parse().unwrap());
    }
    connect_async(request)
        .await
        .map(|(socket, _)| socket)
        .map_err(|e| e.to_string())
}

async fn send(client: &mut Client, frame: Value) {
    client.send(Message::text(frame.to_string())).await.unwrap();
}

/// Next JSON frame, failing the test after two seconds.
async fn next_frame(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Skip frames until one of `kind` arrives.
async fn next_of(client: &mut Client, kind: &str) -> Value {
    loop {
        let frame = next_frame(client).await;
        if frame["type"] == kind {
            return frame;
        }
    }
}

#[tokio::test]
async fn test_handshake_requires_user_id() {
    let app = TestApp::new().await;
    let server = serve(&app).await;

    assert!(connect(server.addr, None).await.is_err());
    assert_eq!(app.engine.connections.connection_count(), 0);
    server.shutdown.cancel();
}

#[tokio::test]
async fn test_subscriber_receives_reports_in_order() {
    let app = TestApp::new().await;
    let server = serve(&app).await;
    let listener = app.resident("listener@example.com", north_of_coast(400.0)).await;
    let author = app.resident("author@example.com", coast()).await;

    let mut client = connect(server.addr, Some(listener.id)).await.unwrap();
    send(&mut client, serde_json::json!({ "type": "subscribe", "room": "geo:13:80" })).await;
    let ack = next_of(&mut client, "subscribed").await;
    assert_eq!(ack["room"], "geo:13:80");

    let mut submitted = Vec::new();
    for _ in 0..3 {
        let receipt = app
            .services
            .reports
            .submit(&ctx(&author), submission(ReportType::Flood, Severity::Low, 0))
            .await
            .unwrap();
        submitted.push(receipt.report.id.to_string());
    }

    for (i, id) in submitted.iter().enumerate() {
        let frame = next_of(&mut client, "event").await;
        assert_eq!(frame["event"], "new_report");
        assert_eq!(frame["room"], "geo:13:80");
        assert_eq!(frame["seq"], (i + 1) as u64);
        assert_eq!(frame["payload"]["id"], *id);
    }
    server.shutdown.cancel();
}

#[tokio::test]
async fn test_foreign_private_room_is_forbidden_and_ping_answers() {
    let app = TestApp::new().await;
    let server = serve(&app).await;
    let user = app.resident("curious@example.com", coast()).await;
    let mut client = connect(server.addr, Some(user.id)).await.unwrap();

    send(
        &mut client,
        serde_json::json!({ "type": "subscribe", "room": format!("user:{}", UserId::new()) }),
    )
    .await;
    let error = next_of(&mut client, "error").await;
    assert_eq!(error["code"], "FORBIDDEN");

    send(&mut client, serde_json::json!({ "type": "ping", "timestamp": 7 })).await;
    let pong = next_of(&mut client, "pong").await;
    assert_eq!(pong["timestamp"], 7);
    server.shutdown.cancel();
}

#[tokio::test]
async fn test_shutdown_closes_open_sessions() {
    let app = TestApp::new().await;
    let server = serve(&app).await;
    let user = app.resident("leaving@example.com", coast()).await;
    let mut client = connect(server.addr, Some(user.id)).await.unwrap();
    send(&mut client, serde_json::json!({ "type": "ping" })).await;
    next_of(&mut client, "pong").await;
    assert_eq!(app.engine.connections.connection_count(), 1);

    server.shutdown.cancel();

    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok());
    assert_eq!(app.engine.connections.connection_count(), 0);
}
