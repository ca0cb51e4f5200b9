//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use megacopy::application::inventory::StockStore;
use megacopy::infrastructure::config::inventory::InventoryConfig;
use megacopy::testkit::{ChannelFeed, MemoryTable};
use tempfile::NamedTempFile;

pub const VALID_CONFIG: &str = r#"
[supabase]
url = "https://abcd.supabase.co"
anon_key = "anon-key"

[logging]
level = "warn"
format = "pretty"
"#;

pub struct Fixture {
    pub table: Arc<MemoryTable>,
    pub feed: Arc<ChannelFeed>,
    pub store: Arc<StockStore>,
}

pub fn fixture<'a>(rows: impl IntoIterator<Item = (&'a str, u32)>) -> Fixture {
    fixture_with(rows, &InventoryConfig::default())
}

pub fn fixture_with<'a>(
    rows: impl IntoIterator<Item = (&'a str, u32)>,
    config: &InventoryConfig,
) -> Fixture {
    let table = Arc::new(MemoryTable::with_stock(rows));
    let feed = Arc::new(ChannelFeed::new());
    let store = Arc::new(StockStore::new(table.clone(), feed.clone(), config));
    Fixture { table, feed, store }
}

pub fn temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("megacopy-config-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
