//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod stock;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// megacopy - Storefront inventory tooling.
#[derive(Parser, Debug)]
#[command(name = "megacopy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and change product stock
    #[command(subcommand)]
    Stock(StockCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `megacopy stock`
#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// Show the current stock of a product
    Get(ProductArgs),
    /// Overwrite the stock of a product
    Set(SetArgs),
    /// Take units out of stock
    Take(TakeArgs),
    /// Print stock changes as they are pushed
    Watch(ProductArgs),
}

/// Subcommands for `megacopy check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
    /// Test REST and realtime connectivity
    Connection(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments naming one product.
#[derive(Parser, Debug)]
pub struct ProductArgs {
    /// Product identifier
    pub product_id: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for `megacopy stock set`.
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Product identifier
    pub product_id: String,

    /// New stock quantity
    pub quantity: u32,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for `megacopy stock take`.
#[derive(Parser, Debug)]
pub struct TakeArgs {
    /// Product identifier
    pub product_id: String,

    /// Units to take
    #[arg(short, long, default_value_t = 1)]
    pub amount: u32,

    /// Guard the write with the current quantity so concurrent buyers cannot oversell
    #[arg(long)]
    pub atomic: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn take_defaults_to_one_unit() {
        let cli = Cli::parse_from(["megacopy", "stock", "take", "p1"]);
        match cli.command {
            Commands::Stock(StockCommand::Take(args)) => {
                assert_eq!(args.product_id, "p1");
                assert_eq!(args.amount, 1);
                assert!(!args.atomic);
                assert_eq!(args.config, PathBuf::from("config.toml"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
