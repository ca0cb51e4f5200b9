//! Viewport and document geometry port.

use crate::domain::{ElementRect, ProductElement, ProductId};

/// The rendered page as seen by the scroll trackers.
///
/// Element rectangles are relative to the viewport's top edge, as a
/// browser's `getBoundingClientRect` reports them.
pub trait Viewport: Send + Sync {
    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f64;

    /// Height of the visible viewport.
    fn height(&self) -> f64;

    /// Full scrollable height of the document.
    fn document_height(&self) -> f64;

    /// All elements tagged with a product identifier, in document order.
    fn product_elements(&self) -> Vec<ProductElement>;

    /// The element tagged with `product_id`, if rendered.
    fn find_product(&self, product_id: &ProductId) -> Option<ElementRect>;

    /// Jump (no smooth scrolling) to an absolute vertical offset.
    fn scroll_to(&self, top: f64);
}
