use thiserror::Error;

use crate::domain::ProductId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Stock store errors.
///
/// Insufficient stock is only an error for [`reserve_stock`]; the plain
/// decrement path reports it as `false`.
///
/// [`reserve_stock`]: crate::application::inventory::StockStore::reserve_stock
#[derive(Error, Debug)]
pub enum StockError {
    #[error("failed to read stock for {product_id}: {reason}")]
    RemoteRead {
        product_id: ProductId,
        reason: String,
    },

    #[error("failed to write stock for {product_id}: {reason}")]
    RemoteWrite {
        product_id: ProductId,
        reason: String,
    },

    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("insufficient stock for {product_id}: {available} < {requested}")]
    Insufficient {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    #[error("stock for {product_id} kept changing after {attempts} attempts")]
    Conflict { product_id: ProductId, attempts: u32 },
}

/// Scroll marker persistence errors.
#[derive(Error, Debug)]
pub enum ScrollError {
    #[error("stored scroll marker is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode scroll marker: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Scroll(#[from] ScrollError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl Error {
    /// The stock error behind this error, if any.
    #[must_use]
    pub fn as_stock(&self) -> Option<&StockError> {
        match self {
            Error::Stock(e) => Some(e),
            _ => None,
        }
    }
}
