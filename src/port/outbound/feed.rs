//! Push channel port for row-level stock changes.

use tokio::sync::{mpsc, oneshot};

use crate::domain::{ProductId, StockChange};
use crate::error::Result;

/// Source of pushed stock changes, one subscription per product row.
pub trait StockFeed: Send + Sync {
    /// Start receiving `UPDATE` events for one product.
    ///
    /// The subscription is established in the background; this only fails
    /// when the request itself is invalid.
    fn subscribe(&self, product_id: &ProductId) -> Result<FeedSubscription>;

    /// Feed name for logging.
    fn feed_name(&self) -> &'static str;
}

/// Live feed subscription: the event receiver plus its teardown handle.
#[derive(Debug)]
pub struct FeedSubscription {
    events: mpsc::Receiver<StockChange>,
    closer: FeedCloser,
}

impl FeedSubscription {
    pub fn new(events: mpsc::Receiver<StockChange>, close: oneshot::Sender<()>) -> Self {
        Self {
            events,
            closer: FeedCloser(Some(close)),
        }
    }

    pub fn into_parts(self) -> (mpsc::Receiver<StockChange>, FeedCloser) {
        (self.events, self.closer)
    }
}

/// Tears the backend subscription down.
///
/// Dropping the closer has the same effect as calling [`FeedCloser::close`].
#[derive(Debug)]
pub struct FeedCloser(Option<oneshot::Sender<()>>);

impl FeedCloser {
    pub fn close(&mut self) {
        if let Some(tx) = self.0.take() {
            // receiver gone means the feed already stopped
            let _ = tx.send(());
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.as_ref().map_or(true, oneshot::Sender::is_closed)
    }
}

impl Drop for FeedCloser {
    fn drop(&mut self) {
        self.close();
    }
}
