//! Test-driven stock feed.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{ProductId, StockChange};
use crate::error::Result;
use crate::port::{FeedSubscription, StockFeed};

struct Subscriber {
    events: mpsc::Sender<StockChange>,
    close: oneshot::Receiver<()>,
}

impl Subscriber {
    fn is_open(&mut self) -> bool {
        matches!(self.close.try_recv(), Err(TryRecvError::Empty)) && !self.events.is_closed()
    }
}

/// Stock feed whose changes are pushed by the test via [`push`](Self::push).
#[derive(Default)]
pub struct ChannelFeed {
    subscribers: Mutex<HashMap<ProductId, Vec<Subscriber>>>,
}

impl ChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a change to every open subscription for its product.
    ///
    /// Returns how many subscriptions received it.
    pub fn push(&self, change: StockChange) -> usize {
        let mut subscribers = self.subscribers.lock();
        let Some(list) = subscribers.get_mut(&change.product_id) else {
            return 0;
        };
        list.retain_mut(Subscriber::is_open);
        list.iter()
            .filter(|sub| sub.events.try_send(change.clone()).is_ok())
            .count()
    }

    /// Open subscriptions for a product.
    pub fn active_subscriptions(&self, product_id: &ProductId) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.get_mut(product_id).map_or(0, |list| {
            list.retain_mut(Subscriber::is_open);
            list.len()
        })
    }
}

impl StockFeed for ChannelFeed {
    fn subscribe(&self, product_id: &ProductId) -> Result<FeedSubscription> {
        let (events_tx, events_rx) = mpsc::channel(64);
        let (close_tx, close_rx) = oneshot::channel();
        self.subscribers
            .lock()
            .entry(product_id.clone())
            .or_default()
            .push(Subscriber {
                events: events_tx,
                close: close_rx,
            });
        Ok(FeedSubscription::new(events_rx, close_tx))
    }

    fn feed_name(&self) -> &'static str {
        "channel"
    }
}
