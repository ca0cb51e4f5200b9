//! Supabase Realtime client for row-level stock changes.
//!
//! Each [`StockFeed::subscribe`] call spawns one task that owns a websocket
//! connection and a single channel joined to `realtime:stock-{id}`.
//!
//! # Connection Lifecycle
//!
//! 1. **Connect**: open the websocket with the anon key attached
//! 2. **Join**: send `phx_join` with a `postgres_changes` filter on the row
//! 3. **Message Loop**: forward decoded `UPDATE`s, send heartbeats
//! 4. **Reconnect**: on close or error, back off and start over
//! 5. **Leave**: on teardown send `phx_leave` and close the socket

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::dto::message::{
    ChangesPayload, InboundMessage, OutboundMessage, EVENT_CLOSE, EVENT_ERROR,
    EVENT_POSTGRES_CHANGES, EVENT_REPLY,
};
use crate::domain::{ProductId, StockChange};
use crate::error::Result;
use crate::infrastructure::config::realtime::RealtimeConfig;
use crate::infrastructure::config::supabase::SupabaseConfig;
use crate::port::{FeedSubscription, StockFeed};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Push feed backed by Supabase Realtime.
pub struct SupabaseRealtime {
    url: String,
    anon_key: String,
    schema: String,
    table: String,
    config: RealtimeConfig,
}

impl SupabaseRealtime {
    #[must_use]
    pub fn new(supabase: &SupabaseConfig, config: RealtimeConfig) -> Self {
        Self {
            url: supabase.realtime_url(),
            anon_key: supabase.anon_key.clone(),
            schema: supabase.schema.clone(),
            table: supabase.table.clone(),
            config,
        }
    }
}

impl StockFeed for SupabaseRealtime {
    fn subscribe(&self, product_id: &ProductId) -> Result<FeedSubscription> {
        url::Url::parse(&self.url)?;

        let (events_tx, events_rx) = mpsc::channel(self.config.channel_capacity);
        let (close_tx, close_rx) = oneshot::channel();

        let channel = StockChannel {
            url: self.url.clone(),
            topic: format!("realtime:stock-{product_id}"),
            product_id: product_id.clone(),
            anon_key: self.anon_key.clone(),
            schema: self.schema.clone(),
            table: self.table.clone(),
            config: self.config.clone(),
            refs: Arc::new(AtomicU64::new(0)),
            events: events_tx,
        };
        tokio::spawn(channel.run(close_rx));

        Ok(FeedSubscription::new(events_rx, close_tx))
    }

    fn feed_name(&self) -> &'static str {
        "supabase-realtime"
    }
}

/// Why a connection's message loop ended.
enum LoopExit {
    /// Teardown requested or nobody is listening any more.
    Shutdown,
    /// Server closed, channel errored, or the socket failed.
    Dropped,
}

struct StockChannel {
    url: String,
    topic: String,
    product_id: ProductId,
    anon_key: String,
    schema: String,
    table: String,
    config: RealtimeConfig,
    refs: Arc<AtomicU64>,
    events: mpsc::Sender<StockChange>,
}

impl StockChannel {
    fn next_ref(&self) -> String {
        (self.refs.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    async fn run(self, mut close_rx: oneshot::Receiver<()>) {
        let mut failures: u32 = 0;
        loop {
            match self.connect_and_join().await {
                Ok(mut ws) => {
                    failures = 0;
                    match self.listen(&mut ws, &mut close_rx).await {
                        LoopExit::Shutdown => {
                            self.leave(&mut ws).await;
                            info!(topic = %self.topic, "Realtime channel closed");
                            return;
                        }
                        LoopExit::Dropped => {
                            warn!(topic = %self.topic, "Realtime connection dropped");
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        topic = %self.topic,
                        error = %e,
                        attempt = failures,
                        "Realtime connection failed"
                    );
                    if failures >= self.config.reconnection.max_consecutive_failures {
                        error!(
                            topic = %self.topic,
                            failures,
                            "Giving up on realtime channel"
                        );
                        return;
                    }
                }
            }

            let delay = self.config.reconnection.delay_for(failures.max(1));
            debug!(topic = %self.topic, delay_ms = delay, "Reconnecting after delay");
            tokio::select! {
                _ = &mut close_rx => return,
                () = self.events.closed() => return,
                () = sleep(Duration::from_millis(delay)) => {}
            }
        }
    }

    async fn connect_and_join(&self) -> Result<Socket> {
        info!(topic = %self.topic, "Connecting to Supabase Realtime");
        let (mut ws, response) = connect_async(self.url.as_str()).await?;
        debug!(status = %response.status(), "Realtime websocket connected");

        let join = OutboundMessage::join(
            &self.topic,
            &self.schema,
            &self.table,
            &self.product_id,
            &self.anon_key,
            self.next_ref(),
        );
        ws.send(Message::Text(serde_json::to_string(&join)?)).await?;
        info!(topic = %self.topic, product_id = %self.product_id, "Joined stock channel");
        Ok(ws)
    }

    async fn listen(&self, ws: &mut Socket, close_rx: &mut oneshot::Receiver<()>) -> LoopExit {
        let mut heartbeat = interval(Duration::from_secs(self.config.heartbeat_interval_secs));
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately; the join just went out
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = &mut *close_rx => return LoopExit::Shutdown,
                () = self.events.closed() => return LoopExit::Shutdown,
                _ = heartbeat.tick() => {
                    let beat = OutboundMessage::heartbeat(self.next_ref());
                    let sent = match serde_json::to_string(&beat) {
                        Ok(json) => ws.send(Message::Text(json)).await.is_ok(),
                        Err(_) => false,
                    };
                    if !sent {
                        return LoopExit::Dropped;
                    }
                }
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(exit) = self.handle_text(&text).await {
                            return exit;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if ws.send(Message::Pong(data)).await.is_err() {
                            return LoopExit::Dropped;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(frame = ?frame, "Realtime websocket closed by server");
                        return LoopExit::Dropped;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "Realtime websocket error");
                        return LoopExit::Dropped;
                    }
                    None => return LoopExit::Dropped,
                },
            }
        }
    }

    async fn handle_text(&self, text: &str) -> Option<LoopExit> {
        let msg = match serde_json::from_str::<InboundMessage>(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, raw = %text, "Failed to parse realtime frame");
                return None;
            }
        };
        if msg.topic != self.topic {
            return None;
        }

        match msg.event.as_str() {
            EVENT_POSTGRES_CHANGES => {
                let payload = match serde_json::from_value::<ChangesPayload>(msg.payload) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "Malformed postgres_changes payload");
                        return None;
                    }
                };
                let change = payload.data.into_stock_change(&self.product_id)?;
                debug!(product_id = %self.product_id, stock = ?change.stock, "Stock change pushed");
                if self.events.send(change).await.is_err() {
                    return Some(LoopExit::Shutdown);
                }
                None
            }
            EVENT_REPLY => {
                if msg.reply_status() == Some("error") {
                    warn!(topic = %self.topic, payload = %msg.payload, "Channel request rejected");
                }
                None
            }
            EVENT_ERROR | EVENT_CLOSE => {
                warn!(topic = %self.topic, event = %msg.event, "Channel closed by server");
                Some(LoopExit::Dropped)
            }
            _ => None,
        }
    }

    async fn leave(&self, ws: &mut Socket) {
        let leave = OutboundMessage::leave(&self.topic, self.next_ref());
        if let Ok(json) = serde_json::to_string(&leave) {
            let _ = ws.send(Message::Text(json)).await;
        }
        let _ = ws.close(None).await;
    }
}
