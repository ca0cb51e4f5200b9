//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the storefront's external dependencies: the
//! hosted product table, its realtime channel, and the browser surface.

pub mod feed;
pub mod product;
pub mod storage;
pub mod viewport;
