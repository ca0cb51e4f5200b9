//! `megacopy stock` handlers.

use std::path::Path;

use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::output;
use super::{ProductArgs, SetArgs, TakeArgs};
use crate::domain::ProductId;
use crate::error::{Result, StockError};
use crate::infrastructure::bootstrap::build_stock_store;
use crate::infrastructure::config::settings::Config;

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.init_logging();
    Ok(config)
}

/// Print the current stock of one product.
pub async fn execute_get(args: &ProductArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = build_stock_store(&config)?;
    let entry = store
        .try_load_stock(&ProductId::new(&args.product_id))
        .await?;
    println!("{}", output::stock_line(&entry));
    Ok(())
}

/// Overwrite the stock of one product.
pub async fn execute_set(args: &SetArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = build_stock_store(&config)?;
    let product_id = ProductId::new(&args.product_id);
    store.update_stock(&product_id, args.quantity).await?;
    output::ok(&format!("{product_id} stock set to {}", args.quantity));
    Ok(())
}

/// Take units out of stock, optionally with a guarded write.
pub async fn execute_take(args: &TakeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = build_stock_store(&config)?;
    let product_id = ProductId::new(&args.product_id);
    store.try_load_stock(&product_id).await?;

    if args.atomic {
        let remaining = store.reserve_stock(&product_id, args.amount).await?;
        output::ok(&format!("took {} of {product_id}, {remaining} left", args.amount));
        return Ok(());
    }

    let available = store.get_stock(&product_id);
    if store.decrement_stock(&product_id, args.amount).await {
        output::ok(&format!(
            "took {} of {product_id}, {} left",
            args.amount,
            store.get_stock(&product_id)
        ));
        Ok(())
    } else if available < args.amount {
        Err(StockError::Insufficient {
            product_id,
            available,
            requested: args.amount,
        }
        .into())
    } else {
        Err(StockError::RemoteWrite {
            product_id,
            reason: "stock update was not applied".into(),
        }
        .into())
    }
}

/// Stream pushed stock changes until interrupted.
pub async fn execute_watch(args: &ProductArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = build_stock_store(&config)?;
    let product_id = ProductId::new(&args.product_id);

    store.load_stock(&product_id).await;
    if let Some(entry) = store.entry(&product_id) {
        println!("{}", output::stock_line(&entry));
    }

    let mut changes = store.changes();
    let subscription = store.subscribe_to_stock_updates(&product_id)?;
    output::section(&format!("Watching {product_id} (Ctrl-C to stop)"));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Ok(entry) => println!("{}", output::stock_line(&entry)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped stock changes"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    subscription.unsubscribe();
    Ok(())
}
