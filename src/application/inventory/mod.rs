//! Client-side stock coordination.
//!
//! [`StockStore`] keeps an in-memory map of stock per product, written
//! through to the remote product table and fed by push subscriptions.

mod store;
mod subscription;

pub use store::StockStore;
pub use subscription::StockSubscription;
