//! Scroll position restoration for the product feed.
//!
//! - [`ScrollTracker`] resumes at the product that was centered in the
//!   viewport, tolerant of layout changes between visits.
//! - [`PageScrollMemory`] stores the raw pixel offset per route.

mod page;
mod tracker;

pub use page::{PageRestore, PageScrollMemory};
pub use tracker::{RestoreOutcome, ScrollTracker};
