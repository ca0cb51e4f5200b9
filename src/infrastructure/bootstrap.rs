//! Composition root: wires adapters into application services.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::supabase::{SupabaseRealtime, SupabaseTable};
use crate::application::inventory::StockStore;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Build a stock store backed by the configured Supabase project.
///
/// Must be called inside a tokio runtime; subscriptions spawn tasks.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_stock_store(config: &Config) -> Result<Arc<StockStore>> {
    let table = SupabaseTable::new(&config.supabase)?;
    let feed = SupabaseRealtime::new(&config.supabase, config.realtime.clone());
    info!(
        table = %config.supabase.table,
        schema = %config.supabase.schema,
        reconcile = ?config.inventory.reconcile,
        "Stock store ready"
    );
    Ok(Arc::new(StockStore::new(
        Arc::new(table),
        Arc::new(feed),
        &config.inventory,
    )))
}

/// Install the ring crypto provider for rustls.
///
/// Both reqwest and tokio-tungstenite pull in rustls; without an explicit
/// default provider the first TLS handshake panics.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
