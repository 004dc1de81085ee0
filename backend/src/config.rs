use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_BINANCE_API_URL: &str = "https://api.binance.com/api/v3";
const DEFAULT_HTTP_TIMEOUT_SECONDS: &str = "7";
const MAX_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// CoinGecko REST base URL
    pub coingecko_api_url: String,

    /// Binance REST base URL
    pub binance_api_url: String,

    /// Ceiling on every upstream request (seconds)
    pub http_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let http_timeout_seconds: u64 = var("HTTP_TIMEOUT_SECONDS", DEFAULT_HTTP_TIMEOUT_SECONDS)
            .trim()
            .parse()
            .context("HTTP_TIMEOUT_SECONDS must be a positive integer")?;
        if http_timeout_seconds == 0 || http_timeout_seconds > MAX_HTTP_TIMEOUT_SECONDS {
            bail!(
                "HTTP_TIMEOUT_SECONDS must be between 1 and {}, got {}",
                MAX_HTTP_TIMEOUT_SECONDS,
                http_timeout_seconds
            );
        }

        Ok(Config {
            coingecko_api_url: trim_base_url(var("COINGECKO_API_URL", DEFAULT_COINGECKO_API_URL)),
            binance_api_url: trim_base_url(var("BINANCE_API_URL", DEFAULT_BINANCE_API_URL)),
            http_timeout_seconds,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
