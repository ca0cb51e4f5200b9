//! Write-through stock cache.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::subscription::StockSubscription;
use crate::domain::{ProductId, ReconcilePolicy, StockChange, StockEntry, StockRow};
use crate::error::{Error, Result, StockError};
use crate::infrastructure::config::inventory::InventoryConfig;
use crate::port::{ProductTable, StockFeed};

/// In-memory stock levels kept consistent with the remote product table.
///
/// Writes go to the table first and reach the cache only once the table
/// accepted them. Pushed changes from [`subscribe_to_stock_updates`]
/// overwrite entries according to the configured [`ReconcilePolicy`].
///
/// `decrement_stock` checks sufficiency against the cache and writes in a
/// separate step, so two concurrent decrements can both pass the check.
/// [`reserve_stock`] closes that gap with a conditional remote write.
///
/// [`subscribe_to_stock_updates`]: Self::subscribe_to_stock_updates
/// [`reserve_stock`]: Self::reserve_stock
pub struct StockStore {
    table: Arc<dyn ProductTable>,
    feed: Arc<dyn StockFeed>,
    stocks: RwLock<HashMap<ProductId, StockEntry>>,
    policy: ReconcilePolicy,
    conflict_retries: u32,
    changes: broadcast::Sender<StockEntry>,
}

impl StockStore {
    pub fn new(
        table: Arc<dyn ProductTable>,
        feed: Arc<dyn StockFeed>,
        config: &InventoryConfig,
    ) -> Self {
        let (changes, _) = broadcast::channel(config.change_capacity.max(1));
        Self {
            table,
            feed,
            stocks: RwLock::new(HashMap::new()),
            policy: config.reconcile,
            conflict_retries: config.conflict_retries.max(1),
            changes,
        }
    }

    /// Cached quantity, or 0 for a product never loaded.
    #[must_use]
    pub fn get_stock(&self, product_id: &ProductId) -> u32 {
        self.stocks
            .read()
            .get(product_id)
            .map_or(0, |entry| entry.quantity)
    }

    #[must_use]
    pub fn entry(&self, product_id: &ProductId) -> Option<StockEntry> {
        self.stocks.read().get(product_id).cloned()
    }

    /// All cached entries, ordered by product id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<StockEntry> {
        let mut entries: Vec<_> = self.stocks.read().values().cloned().collect();
        entries.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        entries
    }

    /// Receive every entry written to the cache from now on.
    pub fn changes(&self) -> broadcast::Receiver<StockEntry> {
        self.changes.subscribe()
    }

    /// Refresh one product from the remote table.
    ///
    /// Failures are logged and leave the cache as it was.
    pub async fn load_stock(&self, product_id: &ProductId) {
        if let Err(e) = self.try_load_stock(product_id).await {
            warn!(product_id = %product_id, error = %e, "Failed to load stock");
        }
    }

    /// Refresh one product from the remote table, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::NotFound`] for an unknown product and
    /// [`StockError::RemoteRead`] for any other backend failure.
    pub async fn try_load_stock(&self, product_id: &ProductId) -> Result<StockEntry> {
        let row = self
            .table
            .fetch_stock(product_id)
            .await
            .map_err(|e| read_error(product_id, e))?;
        Ok(self.store_row(product_id, row))
    }

    /// Write a new quantity and a fresh `updated_at`, then cache it.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::RemoteWrite`] (or [`StockError::NotFound`]) if the
    /// table rejects the write; the cached value is unchanged in that case.
    pub async fn update_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let updated_at = Utc::now();
        if let Err(e) = self
            .table
            .write_stock(product_id, quantity, updated_at)
            .await
        {
            let err = write_error(product_id, e);
            warn!(product_id = %product_id, error = %err, "Failed to update stock");
            return Err(err.into());
        }
        self.store(StockEntry::new(product_id.clone(), quantity, Some(updated_at)));
        debug!(product_id = %product_id, quantity, "Stock updated");
        Ok(())
    }

    /// Take `amount` units using the cached quantity as the baseline.
    ///
    /// Returns `false` without touching the table when the cache holds less
    /// than `amount`, and `false` when the write fails.
    pub async fn decrement_stock(&self, product_id: &ProductId, amount: u32) -> bool {
        let current = self.get_stock(product_id);
        if current < amount {
            debug!(product_id = %product_id, current, amount, "Insufficient stock");
            return false;
        }

        match self.update_stock(product_id, current - amount).await {
            Ok(()) => true,
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "Failed to decrement stock");
                false
            }
        }
    }

    /// [`decrement_stock`](Self::decrement_stock) by one unit.
    pub async fn decrement_one(&self, product_id: &ProductId) -> bool {
        self.decrement_stock(product_id, 1).await
    }

    /// Take `amount` units with a write guarded by the expected quantity.
    ///
    /// When another client changed the row first, the row is re-read and the
    /// write retried while stock still suffices. Returns the remaining stock.
    ///
    /// # Errors
    ///
    /// - [`StockError::Insufficient`] if stock (cached, or re-read after a
    ///   conflict) is below `amount`; nothing is written
    /// - [`StockError::Conflict`] if every attempt lost a race
    /// - [`StockError::RemoteWrite`] / [`StockError::RemoteRead`] /
    ///   [`StockError::NotFound`] on backend failures
    pub async fn reserve_stock(
        &self,
        product_id: &ProductId,
        amount: u32,
    ) -> std::result::Result<u32, StockError> {
        let mut current = self.get_stock(product_id);

        for attempt in 1..=self.conflict_retries {
            if current < amount {
                return Err(StockError::Insufficient {
                    product_id: product_id.clone(),
                    available: current,
                    requested: amount,
                });
            }

            let remaining = current - amount;
            let updated_at = Utc::now();
            let applied = self
                .table
                .write_stock_if(product_id, current, remaining, updated_at)
                .await
                .map_err(|e| write_error(product_id, e))?;

            if applied {
                self.store(StockEntry::new(product_id.clone(), remaining, Some(updated_at)));
                info!(product_id = %product_id, amount, remaining, "Stock reserved");
                return Ok(remaining);
            }

            debug!(
                product_id = %product_id,
                expected = current,
                attempt,
                "Stock changed remotely, re-reading"
            );
            let row = self
                .table
                .fetch_stock(product_id)
                .await
                .map_err(|e| read_error(product_id, e))?;
            current = self.store_row(product_id, row).quantity;
        }

        warn!(product_id = %product_id, attempts = self.conflict_retries, "Reservation kept conflicting");
        Err(StockError::Conflict {
            product_id: product_id.clone(),
            attempts: self.conflict_retries,
        })
    }

    /// Start applying pushed updates for one product.
    ///
    /// Must be called inside a tokio runtime; the forwarding task is spawned
    /// onto it. Outside a runtime this panics.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed rejects the subscription request.
    pub fn subscribe_to_stock_updates(
        self: &Arc<Self>,
        product_id: &ProductId,
    ) -> Result<StockSubscription> {
        let (mut events, closer) = self.feed.subscribe(product_id)?.into_parts();
        let store: Weak<Self> = Arc::downgrade(self);
        let id = product_id.clone();

        let forwarder = tokio::spawn(async move {
            while let Some(change) = events.recv().await {
                let Some(live) = store.upgrade() else {
                    break;
                };
                live.apply_change(change);
            }
            debug!(product_id = %id, "Stock feed ended");
        });

        info!(
            product_id = %product_id,
            feed = self.feed.feed_name(),
            "Subscribed to stock updates"
        );
        Ok(StockSubscription::new(product_id.clone(), forwarder, closer))
    }

    /// Apply one pushed change. Returns whether the cache was modified.
    ///
    /// Changes without a stock value are ignored.
    pub fn apply_change(&self, change: StockChange) -> bool {
        let Some(quantity) = change.stock else {
            debug!(product_id = %change.product_id, "Pushed change carries no stock");
            return false;
        };

        let entry = {
            let mut stocks = self.stocks.write();
            if !self.policy.accepts(stocks.get(&change.product_id), &change) {
                debug!(product_id = %change.product_id, "Ignoring stale stock change");
                return false;
            }
            let entry = StockEntry::new(change.product_id, quantity, change.updated_at);
            stocks.insert(entry.product_id.clone(), entry.clone());
            entry
        };
        debug!(product_id = %entry.product_id, quantity, "Applied pushed stock");
        let _ = self.changes.send(entry);
        true
    }

    fn store_row(&self, product_id: &ProductId, row: StockRow) -> StockEntry {
        let entry = StockEntry::new(product_id.clone(), row.stock, row.updated_at);
        self.store(entry.clone());
        entry
    }

    fn store(&self, entry: StockEntry) {
        self.stocks
            .write()
            .insert(entry.product_id.clone(), entry.clone());
        // no receivers is fine
        let _ = self.changes.send(entry);
    }
}

fn read_error(product_id: &ProductId, err: Error) -> StockError {
    match err {
        Error::Stock(StockError::NotFound(id)) => StockError::NotFound(id),
        other => StockError::RemoteRead {
            product_id: product_id.clone(),
            reason: other.to_string(),
        },
    }
}

fn write_error(product_id: &ProductId, err: Error) -> StockError {
    match err {
        Error::Stock(StockError::NotFound(id)) => StockError::NotFound(id),
        other => StockError::RemoteWrite {
            product_id: product_id.clone(),
            reason: other.to_string(),
        },
    }
}
