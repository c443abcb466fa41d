//! End-to-end tests for `/ws/clone/{job_id}` over a real socket.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{build_test_app, create_job, GatedScraper, StubScraper, TestApp};
use futures::{SinkExt, StreamExt};
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
}

async fn wait_for_connections(app: &TestApp, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.hub.connection_count().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never settled");
}

/// Next text frame as JSON, skipping control frames.
async fn next_event(client: &mut Client) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        match message {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test: subscriber receives progress events through completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscriber_receives_progress_until_completion() {
    let gate = Arc::new(Notify::new());
    let app = build_test_app(Arc::new(GatedScraper { gate: gate.clone() }));
    let addr = serve(&app).await;
    let job_id = create_job(&app, "https://example.com").await;

    let (mut client, _) = connect_async(format!("ws://{addr}/ws/clone/{job_id}"))
        .await
        .unwrap();
    wait_for_connections(&app, 1).await;
    gate.notify_one();

    let mut seen = Vec::new();
    loop {
        let event = next_event(&mut client).await;
        assert_eq!(event["job_id"], job_id);
        assert!(event.get("error_message").is_none());
        let status = event["status"].as_str().unwrap().to_string();
        seen.push((status.clone(), event["progress"].as_u64().unwrap()));
        if status == "completed" {
            break;
        }
    }
    // The scraping event may fire before the socket subscribes.
    let tail: Vec<_> = seen.iter().rev().take(3).rev().cloned().collect();
    assert_eq!(
        tail,
        vec![
            ("processing".to_string(), 50),
            ("generating".to_string(), 70),
            ("completed".to_string(), 100),
        ]
    );

    client.close(None).await.unwrap();
    wait_for_connections(&app, 0).await;
}

// ---------------------------------------------------------------------------
// Test: a second subscriber replaces the first
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_subscriber_replaces_first() {
    let gate = Arc::new(Notify::new());
    let app = build_test_app(Arc::new(GatedScraper { gate: gate.clone() }));
    let addr = serve(&app).await;
    let job_id = create_job(&app, "https://example.com").await;
    let url = format!("ws://{addr}/ws/clone/{job_id}");

    let (mut first, _) = connect_async(url.as_str()).await.unwrap();
    wait_for_connections(&app, 1).await;
    let (mut second, _) = connect_async(url.as_str()).await.unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(5), first.next())
        .await
        .expect("first connection was not closed");
    assert_matches!(frame, Some(Ok(Message::Close(_))) | None | Some(Err(_)));

    gate.notify_one();
    let mut last = next_event(&mut second).await;
    while last["status"] != "completed" {
        last = next_event(&mut second).await;
    }
    assert_eq!(last["progress"], 100);
}

// ---------------------------------------------------------------------------
// Test: upgrade is refused for unknown and malformed job ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_job_is_refused_before_upgrade() {
    let app = build_test_app(StubScraper::succeeding());
    let addr = serve(&app).await;

    let missing = uuid::Uuid::new_v4();
    let result = connect_async(format!("ws://{addr}/ws/clone/{missing}")).await;
    assert_matches!(result, Err(WsError::Http(response)) if response.status() == 404);

    let result = connect_async(format!("ws://{addr}/ws/clone/not-a-uuid")).await;
    assert_matches!(result, Err(WsError::Http(response)) if response.status() == 400);
}
