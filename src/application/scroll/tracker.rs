//! Centered-product scroll tracker.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::{centered_marker, restore_target, ProductId, ScrollMarker};
use crate::error::ScrollError;
use crate::infrastructure::config::scroll::ScrollConfig;
use crate::port::{SessionStorage, Viewport};

/// What [`ScrollTracker::restore`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// Nothing was saved for this session.
    NoMarker,
    /// The saved marker could not be parsed.
    Corrupt,
    /// Scrolled to `target` after `lookups` element lookups.
    Restored {
        product_id: ProductId,
        target: f64,
        lookups: u32,
    },
    /// The product never rendered; no scroll was issued.
    GaveUp { product_id: ProductId, lookups: u32 },
}

/// Remembers which product sat at the viewport midpoint.
///
/// Wire [`on_scroll`](Self::on_scroll) to scroll events,
/// [`on_unload`](Self::on_unload) to page unload, and call
/// [`restore`](Self::restore) once on load.
pub struct ScrollTracker {
    viewport: Arc<dyn Viewport>,
    storage: Arc<dyn SessionStorage>,
    config: ScrollConfig,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ScrollTracker {
    pub fn new(
        viewport: Arc<dyn Viewport>,
        storage: Arc<dyn SessionStorage>,
        config: ScrollConfig,
    ) -> Self {
        Self {
            viewport,
            storage,
            config,
            pending: Mutex::new(None),
        }
    }

    /// Persist the centered product, if any.
    ///
    /// Leaves the previous marker in place when no product straddles the
    /// viewport midpoint.
    pub fn save(&self) -> Option<ScrollMarker> {
        let elements = self.viewport.product_elements();
        let marker = centered_marker(
            &elements,
            self.viewport.scroll_y(),
            self.viewport.height(),
            Utc::now().timestamp_millis(),
        )?;

        match serde_json::to_string(&marker).map_err(ScrollError::Encode) {
            Ok(json) => {
                self.storage.set(&self.config.storage_key, &json);
                debug!(product_id = %marker.product_id, offset = marker.offset, "Saved scroll marker");
                Some(marker)
            }
            Err(e) => {
                warn!(error = %e, "Failed to save scroll marker");
                None
            }
        }
    }

    /// Schedule a save once scrolling has been quiet for the debounce period.
    ///
    /// Each call restarts the quiet period. Must be called inside a tokio
    /// runtime; the delayed save is spawned onto it. Outside a runtime this
    /// panics.
    pub fn on_scroll(self: &Arc<Self>) {
        let tracker = Arc::clone(self);
        let delay = self.config.debounce();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            tracker.save();
        });
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Save immediately, dropping any pending debounced save.
    pub fn on_unload(&self) -> Option<ScrollMarker> {
        self.cancel_pending();
        self.save()
    }

    /// Abort a scheduled save, if one is waiting.
    pub fn cancel_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Read the stored marker.
    ///
    /// # Errors
    ///
    /// Returns [`ScrollError::Corrupt`] if the slot holds invalid JSON.
    pub fn marker(&self) -> Result<Option<ScrollMarker>, ScrollError> {
        self.storage
            .get(&self.config.storage_key)
            .map(|raw| serde_json::from_str(&raw).map_err(ScrollError::Corrupt))
            .transpose()
    }

    /// Scroll back to the saved product once it has rendered.
    ///
    /// Looks the element up immediately, then retries every poll interval
    /// up to `max_attempts` more times. The marker is left in storage.
    pub async fn restore(&self) -> RestoreOutcome {
        let marker = match self.marker() {
            Ok(Some(marker)) => marker,
            Ok(None) => return RestoreOutcome::NoMarker,
            Err(e) => {
                warn!(error = %e, "Abandoning scroll restore");
                return RestoreOutcome::Corrupt;
            }
        };
        debug!(product_id = %marker.product_id, "Restoring scroll position");

        let mut lookups = 0;
        loop {
            lookups += 1;
            if let Some(rect) = self.viewport.find_product(&marker.product_id) {
                let element_top = rect.top + self.viewport.scroll_y();
                let target = restore_target(element_top, marker.offset, self.viewport.height());
                self.viewport.scroll_to(target);
                info!(product_id = %marker.product_id, target, lookups, "Scroll position restored");
                return RestoreOutcome::Restored {
                    product_id: marker.product_id,
                    target,
                    lookups,
                };
            }
            if lookups > self.config.max_attempts {
                debug!(product_id = %marker.product_id, lookups, "Product never rendered");
                return RestoreOutcome::GaveUp {
                    product_id: marker.product_id,
                    lookups,
                };
            }
            sleep(self.config.poll_interval()).await;
        }
    }
}

impl Drop for ScrollTracker {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
