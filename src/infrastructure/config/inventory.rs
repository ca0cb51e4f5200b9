//! Stock store configuration.

use serde::Deserialize;

use crate::domain::ReconcilePolicy;

/// Stock store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// How pushed updates are reconciled with cached entries.
    #[serde(default)]
    pub reconcile: ReconcilePolicy,
    /// Conditional write attempts for `reserve_stock` before giving up.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
    /// Capacity of the cache change broadcast.
    #[serde(default = "default_change_capacity")]
    pub change_capacity: usize,
}

const fn default_conflict_retries() -> u32 {
    3
}

const fn default_change_capacity() -> usize {
    256
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcilePolicy::default(),
            conflict_retries: default_conflict_retries(),
            change_capacity: default_change_capacity(),
        }
    }
}
