//! Per-route pixel scroll memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::port::{SessionStorage, Viewport};

const KEY_PREFIX: &str = "scroll-position:";
/// Positions at or below this are treated as "top of page" and not recorded.
const MIN_RECORDED: f64 = 10.0;
/// Distance within which the restored position counts as reached.
const TOLERANCE: f64 = 10.0;
const MAX_ATTEMPTS: u32 = 50;
/// Attempts with unchanged document height before settling for the bottom.
const STABLE_HEIGHT_ATTEMPTS: u32 = 3;

/// What [`PageScrollMemory::restore`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageRestore {
    NoPosition,
    /// Reached the stored position.
    Restored { position: f64 },
    /// The document stopped growing short of the stored position.
    Clamped { position: f64 },
    GaveUp,
}

/// Stores the scroll offset of one route (`path?query`) in session storage.
pub struct PageScrollMemory {
    viewport: Arc<dyn Viewport>,
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl PageScrollMemory {
    pub fn new(
        viewport: Arc<dyn Viewport>,
        storage: Arc<dyn SessionStorage>,
        path: &str,
        query: &str,
    ) -> Self {
        Self {
            viewport,
            storage,
            key: storage_key(path, query),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored offset for this route.
    pub fn stored(&self) -> Option<f64> {
        let raw = self.storage.get(&self.key)?;
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(f64::trunc)
    }

    /// Record `position`, unless it looks like a transient reset.
    ///
    /// Route transitions briefly report a position near 0; a small value far
    /// below the stored one is dropped. Returns whether it was stored.
    pub fn record(&self, position: f64) -> bool {
        if position <= MIN_RECORDED {
            return false;
        }
        if let Some(stored) = self.stored() {
            if position < stored - 100.0 && position < 100.0 {
                debug!(position, stored, "Ignoring small scroll value");
                return false;
            }
        }
        self.storage.set(&self.key, &format!("{}", position.trunc() as i64));
        debug!(key = %self.key, position, "Saved page scroll position");
        true
    }

    /// Record the viewport's current offset.
    pub fn capture(&self) -> bool {
        self.record(self.viewport.scroll_y())
    }

    /// Scroll back to the stored offset as the document grows.
    pub async fn restore(&self) -> PageRestore {
        let Some(target) = self.stored() else {
            return PageRestore::NoPosition;
        };
        info!(key = %self.key, target, "Restoring page scroll position");

        let mut last_height = 0.0;
        let mut stable = 0;
        for attempt in 1..=MAX_ATTEMPTS {
            if self.reached(target) {
                return PageRestore::Restored { position: target };
            }

            let height = self.viewport.document_height();
            if height == last_height {
                stable += 1;
            } else {
                stable = 0;
            }
            last_height = height;

            let max_scroll = (height - self.viewport.height()).max(0.0);
            if target <= max_scroll {
                self.viewport.scroll_to(target);
            } else if stable >= STABLE_HEIGHT_ATTEMPTS {
                debug!(max_scroll, target, "Document stopped growing");
                self.viewport.scroll_to(max_scroll);
                return PageRestore::Clamped {
                    position: max_scroll,
                };
            }

            sleep(backoff(attempt)).await;
        }

        // the final attempt's scroll has not been checked yet
        if self.reached(target) {
            return PageRestore::Restored { position: target };
        }
        PageRestore::GaveUp
    }

    fn reached(&self, target: f64) -> bool {
        (self.viewport.scroll_y() - target).abs() < TOLERANCE
    }
}

fn storage_key(path: &str, query: &str) -> String {
    format!("{KEY_PREFIX}{path}?{query}")
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(u64::from((50 * (attempt / 5)).min(500)))
}
