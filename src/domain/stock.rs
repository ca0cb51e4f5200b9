//! Stock levels and push notifications.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::ProductId;

/// Cached stock level for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEntry {
    pub product_id: ProductId,
    pub quantity: u32,
    /// `updated_at` of the remote row this value came from, when known.
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockEntry {
    pub fn new(product_id: ProductId, quantity: u32, updated_at: Option<DateTime<Utc>>) -> Self {
        Self {
            product_id,
            quantity,
            updated_at,
        }
    }

    /// True when `other` carries a strictly newer row timestamp.
    ///
    /// An update without timestamp is never considered stale.
    #[must_use]
    pub fn is_superseded_by(&self, other: Option<DateTime<Utc>>) -> bool {
        match (self.updated_at, other) {
            (Some(current), Some(incoming)) => incoming > current,
            _ => true,
        }
    }
}

/// Stock columns as read from the remote product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StockRow {
    pub stock: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A row-level update pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: ProductId,
    /// `None` when the pushed row did not include a `stock` column.
    pub stock: Option<u32>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockChange {
    pub fn new(product_id: impl Into<ProductId>, stock: u32) -> Self {
        Self {
            product_id: product_id.into(),
            stock: Some(stock),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }
}

/// How pushed updates are reconciled with the cached entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePolicy {
    /// Apply every pushed update in arrival order.
    #[default]
    Arrival,
    /// Apply a pushed update only if its row timestamp is newer.
    Newest,
}

impl ReconcilePolicy {
    #[must_use]
    pub fn accepts(self, current: Option<&StockEntry>, change: &StockChange) -> bool {
        match (self, current) {
            (Self::Arrival, _) | (Self::Newest, None) => true,
            (Self::Newest, Some(entry)) => entry.is_superseded_by(change.updated_at),
        }
    }
}
