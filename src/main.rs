use clap::Parser;
use megacopy::cli::{self, CheckCommand, Cli, Commands, StockCommand};
use megacopy::error::Result;
use megacopy::infrastructure::bootstrap::install_crypto_provider;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    install_crypto_provider();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Stock(StockCommand::Get(args)) => cli::stock::execute_get(&args).await,
        Commands::Stock(StockCommand::Set(args)) => cli::stock::execute_set(&args).await,
        Commands::Stock(StockCommand::Take(args)) => cli::stock::execute_take(&args).await,
        Commands::Stock(StockCommand::Watch(args)) => cli::stock::execute_watch(&args).await,
        Commands::Check(CheckCommand::Config(args)) => cli::check::execute_config(&args.config),
        Commands::Check(CheckCommand::Connection(args)) => {
            cli::check::execute_connection(&args.config).await
        }
    }
}
