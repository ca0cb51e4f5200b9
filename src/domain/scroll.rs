//! Scroll markers and the viewport geometry used to compute them.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// Bounding rectangle of an element, relative to the viewport's top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

/// A rendered element tagged with a product identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductElement {
    pub product_id: ProductId,
    pub rect: ElementRect,
}

/// Which product sat at the viewport midpoint, and where within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMarker {
    pub product_id: ProductId,
    /// Viewport midpoint minus the product's top edge, in pixels.
    pub offset: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Find the product straddling the viewport midpoint.
///
/// Elements are scanned in document order and the first whose extent
/// contains the midpoint wins, edges inclusive.
pub fn centered_marker<'a, I>(
    elements: I,
    scroll_y: f64,
    viewport_height: f64,
    timestamp: i64,
) -> Option<ScrollMarker>
where
    I: IntoIterator<Item = &'a ProductElement>,
{
    let middle = scroll_y + viewport_height / 2.0;
    elements.into_iter().find_map(|element| {
        let top = element.rect.top + scroll_y;
        let bottom = top + element.rect.height;
        (top <= middle && bottom >= middle).then(|| ScrollMarker {
            product_id: element.product_id.clone(),
            offset: middle - top,
            timestamp,
        })
    })
}

/// Scroll position that puts `element_top + offset` at the viewport midpoint.
///
/// `element_top` is in document coordinates. Never negative.
#[must_use]
pub fn restore_target(element_top: f64, offset: f64, viewport_height: f64) -> f64 {
    (element_top + offset - viewport_height / 2.0).max(0.0)
}
