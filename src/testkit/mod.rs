//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`table`] - [`MemoryTable`], an in-memory [`ProductTable`](crate::port::ProductTable)
//!   with failure injection and write counting.
//! - [`feed`] - [`ChannelFeed`], a [`StockFeed`](crate::port::StockFeed) whose
//!   events are pushed by the test.
//! - [`viewport`] - [`FakeViewport`], a scriptable page with product elements.

pub mod feed;
pub mod table;
pub mod viewport;

pub use feed::ChannelFeed;
pub use table::MemoryTable;
pub use viewport::FakeViewport;
