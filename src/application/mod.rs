//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the storefront's client-side use cases.

pub mod inventory;
pub mod scroll;
