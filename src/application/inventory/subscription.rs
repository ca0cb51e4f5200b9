//! Handle for a live stock push subscription.

use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::ProductId;
use crate::port::FeedCloser;

/// Keeps one product's push updates flowing into the store.
///
/// Call [`unsubscribe`](Self::unsubscribe) when the product leaves the
/// screen. Dropping the handle tears the subscription down as well, so it
/// must be bound for as long as updates are wanted.
#[must_use = "dropping a StockSubscription unsubscribes immediately"]
#[derive(Debug)]
pub struct StockSubscription {
    product_id: ProductId,
    forwarder: Option<JoinHandle<()>>,
    closer: Option<FeedCloser>,
}

impl StockSubscription {
    pub(crate) fn new(product_id: ProductId, forwarder: JoinHandle<()>, closer: FeedCloser) -> Self {
        Self {
            product_id,
            forwarder: Some(forwarder),
            closer: Some(closer),
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// True until unsubscribed or the feed ends on its own.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.forwarder.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop applying updates and release the backend channel.
    pub fn unsubscribe(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut closer) = self.closer.take() {
            closer.close();
        }
        if let Some(task) = self.forwarder.take() {
            task.abort();
            debug!(product_id = %self.product_id, "Stock subscription closed");
        }
    }
}

impl Drop for StockSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}
