//! Scriptable viewport.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use crate::domain::{ElementRect, ProductElement, ProductId};
use crate::port::Viewport;

#[derive(Debug)]
struct Page {
    scroll_y: f64,
    height: f64,
    /// Minimum document height; grows to fit elements.
    document_height: f64,
    /// (id, document top, height)
    elements: Vec<(ProductId, f64, f64)>,
    scroll_calls: Vec<f64>,
}

/// In-memory page whose elements are laid out in document coordinates.
#[derive(Debug)]
pub struct FakeViewport {
    page: Mutex<Page>,
    lookups: AtomicU32,
}

impl FakeViewport {
    pub fn new(height: f64) -> Self {
        Self {
            page: Mutex::new(Page {
                scroll_y: 0.0,
                height,
                document_height: height,
                elements: Vec::new(),
                scroll_calls: Vec::new(),
            }),
            lookups: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_product(self, id: &str, top: f64, height: f64) -> Self {
        self.add_product(id, top, height);
        self
    }

    /// Render a product element (e.g. once its data has loaded).
    pub fn add_product(&self, id: &str, top: f64, height: f64) {
        self.page
            .lock()
            .elements
            .push((ProductId::new(id), top, height));
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.page.lock().scroll_y = y;
    }

    pub fn set_document_height(&self, height: f64) {
        self.page.lock().document_height = height;
    }

    /// Every `scroll_to` target, in call order.
    pub fn scroll_calls(&self) -> Vec<f64> {
        self.page.lock().scroll_calls.clone()
    }

    /// Number of `find_product` calls.
    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Viewport for FakeViewport {
    fn scroll_y(&self) -> f64 {
        self.page.lock().scroll_y
    }

    fn height(&self) -> f64 {
        self.page.lock().height
    }

    fn document_height(&self) -> f64 {
        let page = self.page.lock();
        page.elements
            .iter()
            .map(|(_, top, height)| top + height)
            .fold(page.document_height, f64::max)
    }

    fn product_elements(&self) -> Vec<ProductElement> {
        let page = self.page.lock();
        page.elements
            .iter()
            .map(|(id, top, height)| ProductElement {
                product_id: id.clone(),
                rect: ElementRect::new(top - page.scroll_y, *height),
            })
            .collect()
    }

    fn find_product(&self, product_id: &ProductId) -> Option<ElementRect> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let page = self.page.lock();
        page.elements
            .iter()
            .find(|(id, _, _)| id == product_id)
            .map(|(_, top, height)| ElementRect::new(top - page.scroll_y, *height))
    }

    fn scroll_to(&self, top: f64) {
        let mut page = self.page.lock();
        let max = (page.document_height.max(
            page.elements
                .iter()
                .map(|(_, t, h)| t + h)
                .fold(0.0, f64::max),
        ) - page.height)
            .max(0.0);
        page.scroll_y = top.clamp(0.0, max);
        page.scroll_calls.push(top);
    }
}
