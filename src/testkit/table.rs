//! In-memory product table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{ProductId, StockRow};
use crate::error::{Error, Result, StockError};
use crate::port::ProductTable;

/// Product table held in a map, standing in for the hosted backend.
///
/// Every write call (applied or not) bumps [`write_count`](Self::write_count).
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: RwLock<HashMap<ProductId, StockRow>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    always_conflict: AtomicBool,
    writes: AtomicU32,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock<'a>(rows: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let table = Self::new();
        for (id, stock) in rows {
            table.set_stock(&ProductId::new(id), stock);
        }
        table
    }

    /// Change a row as another client would, without counting a write.
    pub fn set_stock(&self, product_id: &ProductId, stock: u32) {
        self.rows.write().insert(
            product_id.clone(),
            StockRow {
                stock,
                updated_at: Some(Utc::now()),
            },
        );
    }

    pub fn stock(&self, product_id: &ProductId) -> Option<u32> {
        self.rows.read().get(product_id).map(|row| row.stock)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every guarded write miss its guard.
    pub fn always_conflict(&self, conflict: bool) {
        self.always_conflict.store(conflict, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    fn begin_write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Connection("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductTable for MemoryTable {
    async fn fetch_stock(&self, product_id: &ProductId) -> Result<StockRow> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Connection("injected read failure".into()));
        }
        self.rows
            .read()
            .get(product_id)
            .copied()
            .ok_or_else(|| StockError::NotFound(product_id.clone()).into())
    }

    async fn write_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.begin_write()?;
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(product_id)
            .ok_or_else(|| StockError::NotFound(product_id.clone()))?;
        row.stock = quantity;
        row.updated_at = Some(updated_at);
        Ok(())
    }

    async fn write_stock_if(
        &self,
        product_id: &ProductId,
        expected: u32,
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.begin_write()?;
        if self.always_conflict.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut rows = self.rows.write();
        match rows.get_mut(product_id) {
            Some(row) if row.stock == expected => {
                row.stock = quantity;
                row.updated_at = Some(updated_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn table_name(&self) -> &str {
        "memory"
    }
}
