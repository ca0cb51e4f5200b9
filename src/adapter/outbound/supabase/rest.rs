//! PostgREST client for the product table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use tracing::debug;

use super::dto::request::{PostgrestError, StockPatch};
use crate::domain::{ProductId, StockRow};
use crate::error::{Error, Result, StockError};
use crate::infrastructure::config::supabase::SupabaseConfig;
use crate::port::ProductTable;

const STOCK_COLUMNS: &str = "stock,updated_at";

/// Product table served by Supabase's PostgREST endpoint.
pub struct SupabaseTable {
    http: HttpClient,
    endpoint: String,
    anon_key: String,
    schema: String,
    table: String,
}

impl SupabaseTable {
    /// Build a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.rest_url(),
            anon_key: config.anon_key.clone(),
            schema: config.schema.clone(),
            table: config.table.clone(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let profile = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        self.http
            .request(method, &self.endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header(profile, &self.schema)
    }

    async fn patch(
        &self,
        filters: &[(&str, String)],
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<Vec<StockRow>> {
        let response = self
            .request(Method::PATCH)
            .query(filters)
            .query(&[("select", STOCK_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(&StockPatch {
                stock: quantity,
                updated_at,
            })
            .send()
            .await?;
        rows(response).await
    }
}

fn id_filter(product_id: &ProductId) -> (&'static str, String) {
    ("id", format!("eq.{product_id}"))
}

async fn rows(response: Response) -> Result<Vec<StockRow>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestError>(&body)
        .map(|e| match e.code {
            Some(code) => format!("{} ({code})", e.message),
            None => e.message,
        })
        .unwrap_or(body);
    Err(Error::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ProductTable for SupabaseTable {
    async fn fetch_stock(&self, product_id: &ProductId) -> Result<StockRow> {
        let response = self
            .request(Method::GET)
            .query(&[("select", STOCK_COLUMNS.to_string()), id_filter(product_id)])
            .send()
            .await?;
        let found = rows(response).await?;
        debug!(product_id = %product_id, rows = found.len(), "Fetched stock");
        found
            .into_iter()
            .next()
            .ok_or_else(|| StockError::NotFound(product_id.clone()).into())
    }

    async fn write_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let written = self
            .patch(&[id_filter(product_id)], quantity, updated_at)
            .await?;
        if written.is_empty() {
            return Err(StockError::NotFound(product_id.clone()).into());
        }
        Ok(())
    }

    async fn write_stock_if(
        &self,
        product_id: &ProductId,
        expected: u32,
        quantity: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let filters = [id_filter(product_id), ("stock", format!("eq.{expected}"))];
        let written = self.patch(&filters, quantity, updated_at).await?;
        Ok(!written.is_empty())
    }

    fn table_name(&self) -> &str {
        &self.table
    }
}
