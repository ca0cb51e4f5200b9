//! `megacopy check` handlers.

use std::path::Path;

use tokio::time::{timeout, Duration};

use super::output;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;

/// Validate a configuration file and print its effective settings.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = Config::load(config_path)?;

    output::section("Configuration");
    output::key_value("Project", &config.supabase.url);
    output::key_value("Table", format!("{}.{}", config.supabase.schema, config.supabase.table));
    output::key_value("Reconcile", format!("{:?}", config.inventory.reconcile));
    output::key_value("Debounce", format!("{}ms", config.scroll.debounce_ms));
    output::key_value(
        "Restore",
        format!(
            "{} retries every {}ms",
            config.scroll.max_attempts, config.scroll.poll_interval_ms
        ),
    );
    println!();
    output::ok("Configuration is valid");
    Ok(())
}

/// Test REST and realtime connectivity.
pub async fn execute_connection<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = Config::load(config_path)?;
    let supabase = &config.supabase;

    output::section("Connection");
    output::key_value("REST", supabase.rest_url());
    output::key_value("Realtime", supabase.url.trim_end_matches('/'));
    println!();

    output::progress("Testing REST API");
    let response = reqwest::Client::new()
        .get(supabase.rest_url())
        .query(&[("select", "id"), ("limit", "1")])
        .header("apikey", &supabase.anon_key)
        .bearer_auth(&supabase.anon_key)
        .send()
        .await;
    match response {
        Ok(response) if response.status().is_success() => output::progress_done(true),
        Ok(response) => {
            output::progress_done(false);
            return Err(Error::Backend {
                status: response.status().as_u16(),
                message: "REST API returned non-success status".into(),
            });
        }
        Err(e) => {
            output::progress_done(false);
            return Err(Error::Connection(e.to_string()));
        }
    }

    output::progress("Testing realtime websocket");
    let url = supabase.realtime_url();
    match timeout(
        Duration::from_secs(supabase.timeout_secs),
        tokio_tungstenite::connect_async(url.as_str()),
    )
    .await
    {
        Ok(Ok(_)) => output::progress_done(true),
        Ok(Err(e)) => {
            output::progress_done(false);
            return Err(e.into());
        }
        Err(_) => {
            output::progress_done(false);
            return Err(Error::Connection("realtime handshake timed out".into()));
        }
    }

    println!();
    output::ok("All connection tests passed");
    Ok(())
}
