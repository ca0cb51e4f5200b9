//! Backend-agnostic domain types.

mod id;
mod scroll;
mod stock;

pub use id::ProductId;
pub use scroll::{
    centered_marker, restore_target, ElementRect, ProductElement, ScrollMarker,
};
pub use stock::{ReconcilePolicy, StockChange, StockEntry, StockRow};
