//! Realtime channel behavior against a local Phoenix-speaking websocket server.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use megacopy::adapter::outbound::supabase::SupabaseRealtime;
use megacopy::application::inventory::StockStore;
use megacopy::domain::ProductId;
use megacopy::infrastructure::bootstrap::install_crypto_provider;
use megacopy::infrastructure::config::inventory::InventoryConfig;
use megacopy::infrastructure::config::realtime::RealtimeConfig;
use megacopy::infrastructure::config::supabase::SupabaseConfig;
use megacopy::testkit::MemoryTable;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

const WAIT: Duration = Duration::from_secs(5);

/// Frames the server received, tagged with the connection they arrived on.
type Received = mpsc::UnboundedReceiver<(usize, Value)>;
/// Frames the test wants the server to push on the current connection.
type Script = mpsc::UnboundedSender<String>;

async fn serve(
    mut ws: WebSocketStream<TcpStream>,
    conn: usize,
    received: &mpsc::UnboundedSender<(usize, Value)>,
    script: &mut mpsc::UnboundedReceiver<String>,
) {
    loop {
        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(value) = serde_json::from_str::<Value>(&text) {
                        let _ = received.send((conn, value));
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => {}
            },
            out = script.recv() => match out {
                Some(text) => {
                    if ws.send(Message::Text(text)).await.is_err() {
                        return;
                    }
                }
                None => return,
            },
        }
    }
}

async fn start_server() -> (String, Received, Script) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (received_tx, received_rx) = mpsc::unbounded_channel();
    let (script_tx, mut script_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut conn = 0;
        while let Ok((socket, _)) = listener.accept().await {
            conn += 1;
            let Ok(ws) = accept_async(socket).await else {
                continue;
            };
            serve(ws, conn, &received_tx, &mut script_rx).await;
        }
    });

    (format!("http://{addr}"), received_rx, script_tx)
}

fn realtime(url: &str) -> SupabaseRealtime {
    install_crypto_provider();
    let supabase = SupabaseConfig {
        url: url.to_string(),
        anon_key: "anon".into(),
        ..SupabaseConfig::default()
    };
    let mut config = RealtimeConfig::default();
    config.reconnection.initial_delay_ms = 10;
    config.reconnection.max_delay_ms = 50;
    SupabaseRealtime::new(&supabase, config)
}

fn store(table: MemoryTable, feed: SupabaseRealtime) -> Arc<StockStore> {
    Arc::new(StockStore::new(
        Arc::new(table),
        Arc::new(feed),
        &InventoryConfig::default(),
    ))
}

fn stock_update(topic: &str, product_id: &str, stock: u32) -> String {
    json!({
        "topic": topic,
        "event": "postgres_changes",
        "ref": null,
        "payload": {
            "ids": [1],
            "data": {
                "type": "UPDATE",
                "schema": "public",
                "table": "products",
                "commit_timestamp": "2024-05-01T10:00:00Z",
                "record": { "id": product_id, "stock": stock }
            }
        }
    })
    .to_string()
}

async fn next_frame(received: &mut Received) -> (usize, Value) {
    loop {
        let (conn, frame) = timeout(WAIT, received.recv())
            .await
            .expect("server frame in time")
            .expect("server running");
        if frame["event"] != "heartbeat" {
            return (conn, frame);
        }
    }
}

#[tokio::test]
async fn channel_joins_forwards_and_leaves() {
    let (url, mut received, script) = start_server().await;
    let store = store(MemoryTable::with_stock([("p1", 5)]), realtime(&url));
    let p1 = ProductId::new("p1");
    store.load_stock(&p1).await;
    let mut changes = store.changes();

    let subscription = store.subscribe_to_stock_updates(&p1).unwrap();

    let (_, join) = next_frame(&mut received).await;
    assert_eq!(join["event"], "phx_join");
    assert_eq!(join["topic"], "realtime:stock-p1");
    let filter = &join["payload"]["config"]["postgres_changes"][0];
    assert_eq!(filter["event"], "UPDATE");
    assert_eq!(filter["filter"], "id=eq.p1");
    assert_eq!(join["payload"]["access_token"], "anon");

    script.send(stock_update("realtime:stock-p2", "p1", 99)).unwrap();
    script.send(stock_update("realtime:stock-p1", "p1", 3)).unwrap();

    let entry = timeout(WAIT, changes.recv()).await.unwrap().unwrap();
    assert_eq!(entry.quantity, 3, "frame for another topic must be skipped");
    assert_eq!(store.get_stock(&p1), 3);

    subscription.unsubscribe();

    let (_, leave) = next_frame(&mut received).await;
    assert_eq!(leave["event"], "phx_leave");
    assert_eq!(leave["topic"], "realtime:stock-p1");
}

#[tokio::test]
async fn malformed_frames_are_skipped() {
    let (url, mut received, script) = start_server().await;
    let store = store(MemoryTable::with_stock([("p1", 5)]), realtime(&url));
    let p1 = ProductId::new("p1");
    let mut changes = store.changes();

    let _subscription = store.subscribe_to_stock_updates(&p1).unwrap();
    next_frame(&mut received).await;

    script.send("not json".to_string()).unwrap();
    script
        .send(json!({"topic": "realtime:stock-p1", "event": "postgres_changes", "payload": {}}).to_string())
        .unwrap();
    script.send(stock_update("realtime:stock-p1", "p1", 2)).unwrap();

    let entry = timeout(WAIT, changes.recv()).await.unwrap().unwrap();
    assert_eq!(entry.quantity, 2);
}

#[tokio::test]
async fn channel_rejoins_after_server_close() {
    let (url, mut received, script) = start_server().await;
    let store = store(MemoryTable::with_stock([("p1", 5)]), realtime(&url));
    let p1 = ProductId::new("p1");
    let mut changes = store.changes();

    let _subscription = store.subscribe_to_stock_updates(&p1).unwrap();
    let (first_conn, join) = next_frame(&mut received).await;
    assert_eq!(join["event"], "phx_join");

    script
        .send(json!({"topic": "realtime:stock-p1", "event": "phx_close", "payload": {}, "ref": null}).to_string())
        .unwrap();

    let (second_conn, rejoin) = next_frame(&mut received).await;
    assert_eq!(rejoin["event"], "phx_join");
    assert_eq!(rejoin["topic"], "realtime:stock-p1");
    assert!(second_conn > first_conn, "join must arrive on a new connection");

    script.send(stock_update("realtime:stock-p1", "p1", 1)).unwrap();
    let entry = timeout(WAIT, changes.recv()).await.unwrap().unwrap();
    assert_eq!(entry.quantity, 1);
}
