//! Product table port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ProductId, StockRow};
use crate::error::Result;

/// Remote table holding the authoritative stock for each product.
///
/// Implementations must return [`StockError::NotFound`] when no row matches
/// the identifier, so callers can tell a missing product from a transport
/// failure.
///
/// [`StockError::NotFound`]: crate::error::StockError::NotFound
#[async_trait]
pub trait ProductTable: Send + Sync {
    /// Read the stock columns of one row.
    async fn fetch_stock(&self, product_id: &ProductId) -> Result<StockRow>;

    /// Overwrite stock and `updated_at` of one row.
    async fn write_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Overwrite stock only if the row still holds `expected`.
    ///
    /// Returns `false` when the guard did not match.
    async fn write_stock_if(
        &self,
        product_id: &ProductId,
        expected: u32,
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Table name for logging.
    fn table_name(&self) -> &str;
}
