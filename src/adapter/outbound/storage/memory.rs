//! In-process session storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::port::SessionStorage;

/// Session storage held in memory for the lifetime of the process.
///
/// Matches browser `sessionStorage` semantics for a single tab: values
/// survive navigation within the process and vanish when it exits.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.slots.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.slots.write().remove(key);
    }
}
