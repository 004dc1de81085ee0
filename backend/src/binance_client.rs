use crate::{
    error::{OracleError, Result},
    types::{fetch_body, PriceSource, Quote},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const PROVIDER: &str = "binance";

/// Symbols Binance can quote, mapped to their USDT spot pair
const TRADING_PAIRS: &[(&str, &str)] = &[("ethereum", "ETHUSDT"), ("bitcoin", "BTCUSDT")];

/// Binance spot ticker client
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
}

/// `GET /ticker/price` body; Binance encodes prices as decimal strings
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

impl BinanceClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    pub fn trading_pair(symbol: &str) -> Option<&'static str> {
        TRADING_PAIRS
            .iter()
            .find(|(known, _)| *known == symbol)
            .map(|(_, pair)| *pair)
    }

    fn parse_price(body: &[u8]) -> Result<f64> {
        let ticker: TickerPrice = serde_json::from_slice(body)
            .map_err(|e| OracleError::decode(PROVIDER, e.to_string()))?;

        ticker
            .price
            .trim()
            .parse::<f64>()
            .map_err(|e| OracleError::decode(PROVIDER, format!("price {:?}: {}", ticker.price, e)))
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let pair = Self::trading_pair(symbol).ok_or_else(|| OracleError::UnsupportedSymbol {
            provider: PROVIDER,
            symbol: symbol.to_string(),
        })?;

        let url = format!("{}/ticker/price", self.base_url);
        debug!("Fetching Binance price for {} ({}) from {}", symbol, pair, url);

        let request = self.http.get(&url).query(&[("symbol", pair)]);
        let body = fetch_body(PROVIDER, request).await?;

        let price = Self::parse_price(&body)?;
        let quote = Quote::observed(PROVIDER, symbol, price)?;

        debug!("Binance price for {}: ${}", symbol, quote.value_usd);

        Ok(quote)
    }
}
