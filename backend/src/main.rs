use std::convert::Infallible;
use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod binance_client;
mod coingecko_client;
mod config;
mod error;
mod price_aggregator;
mod scheduler;
mod types;

#[cfg(test)]
mod test_support;

use binance_client::BinanceClient;
use coingecko_client::CoinGeckoClient;
use config::Config;
use price_aggregator::PriceAggregator;
use scheduler::{Mode, Scheduler};

/// Blend CoinGecko and Binance spot prices into one USD quote
#[derive(Debug, Parser)]
#[command(name = "price-oracle", version)]
struct Args {
    /// Asset to quote, as a CoinGecko coin id (e.g. ethereum, bitcoin)
    symbol: String,

    /// Republish every N seconds; omit, 0, negative or non-numeric for a single quote
    #[arg(allow_negative_numbers = true, value_parser = lenient_interval)]
    interval_seconds: Option<i64>,
}

/// Anything that is not an integer counts as "no interval"
fn lenient_interval(raw: &str) -> Result<i64, Infallible> {
    Ok(raw.parse().unwrap_or(0))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout only carries quotes
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("Failed to create HTTP client")?;

    let aggregator = PriceAggregator::new(
        Box::new(CoinGeckoClient::new(http.clone(), &config.coingecko_api_url)),
        Box::new(BinanceClient::new(http, &config.binance_api_url)),
    );
    let mut scheduler = Scheduler::new(aggregator, &args.symbol, io::stdout(), io::stderr());

    match Mode::from_interval(args.interval_seconds) {
        Mode::SingleShot => {
            if scheduler.run_once().await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Mode::Periodic(period) => {
            tracing::info!("🚀 Starting price oracle for {}", args.symbol);
            scheduler.run_periodic(period, shutdown_signal()).await;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
