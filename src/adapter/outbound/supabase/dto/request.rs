//! PostgREST request bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Body of a stock `PATCH`.
#[derive(Debug, Serialize)]
pub struct StockPatch {
    pub stock: u32,
    pub updated_at: DateTime<Utc>,
}

/// PostgREST error body.
#[derive(Debug, serde::Deserialize)]
pub struct PostgrestError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}
