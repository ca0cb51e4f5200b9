//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (the hosted product table, its push channel, the browser
//! viewport and session storage).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Product │            │  Realtime   │              │ Viewport/ │
//! │  Table  │            │    Feed     │              │  Storage  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ProductTable`] - Read and write stock on the remote product table
//! - [`StockFeed`] - Row-level push updates for one product
//! - [`Viewport`] - Element geometry and scroll position
//! - [`SessionStorage`] - Tab-scoped key/value slot

pub mod outbound;

pub use outbound::feed::{FeedCloser, FeedSubscription, StockFeed};
pub use outbound::product::ProductTable;
pub use outbound::storage::SessionStorage;
pub use outbound::viewport::Viewport;
