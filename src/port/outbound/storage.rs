//! Session-scoped key/value storage port.

/// Synchronous, tab-scoped string storage (the browser's `sessionStorage`).
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
