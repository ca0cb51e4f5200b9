//! megacopy - Client-side coordination core of the MEGA COPY storefront.
//!
//! This crate keeps product stock in a write-through cache synchronized with
//! the hosted `products` table, and restores scroll position on the product
//! feed across reloads.
//!
//! # Architecture
//!
//! - **`domain`** - Product ids, stock entries, scroll markers and geometry
//! - **`port`** - Traits for the product table, push feed, viewport and storage
//! - **`application`** - Use cases
//!   - `StockStore` - Write-through stock cache with push subscriptions
//!   - `ScrollTracker` - Centered-product scroll restoration
//!   - `PageScrollMemory` - Per-route pixel scroll restoration
//! - **`adapter`** - Supabase PostgREST/Realtime clients, in-memory session storage
//! - **`infrastructure`** - Configuration and wiring
//!
//! # Example
//!
//! ```no_run
//! use megacopy::domain::ProductId;
//! use megacopy::infrastructure::bootstrap::build_stock_store;
//! use megacopy::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> megacopy::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let store = build_stock_store(&config)?;
//! let id = ProductId::new("p1");
//!
//! store.load_stock(&id).await;
//! let _subscription = store.subscribe_to_stock_updates(&id)?;
//! if store.decrement_stock(&id, 1).await {
//!     println!("{} left", store.get_stock(&id));
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
