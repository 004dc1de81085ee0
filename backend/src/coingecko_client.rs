use crate::{
    error::{OracleError, Result},
    types::{fetch_body, PriceSource, Quote},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

const PROVIDER: &str = "coingecko";

/// `{"<coin id>": {"usd": <price>}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// CoinGecko simple-price client; symbols are CoinGecko coin ids
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    fn parse_price(symbol: &str, body: &[u8]) -> Result<f64> {
        let prices: SimplePriceResponse = serde_json::from_slice(body)
            .map_err(|e| OracleError::decode(PROVIDER, e.to_string()))?;

        prices
            .get(symbol)
            .and_then(|currencies| currencies.get("usd"))
            .copied()
            .ok_or_else(|| OracleError::decode(PROVIDER, format!("no usd price for {}", symbol)))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}/simple/price", self.base_url);
        debug!("Fetching CoinGecko price for {} from {}", symbol, url);

        let request = self.http.get(&url).query(&[("ids", symbol), ("vs_currencies", "usd")]);
        let body = fetch_body(PROVIDER, request).await?;

        let price = Self::parse_price(symbol, &body)?;
        let quote = Quote::observed(PROVIDER, symbol, price)?;

        debug!("CoinGecko price for {}: ${}", symbol, quote.value_usd);

        Ok(quote)
    }
}
