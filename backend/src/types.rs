use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{OracleError, Result};

/// One price observation, as emitted on stdout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Asset identifier (e.g., "ethereum")
    pub symbol: String,

    /// Price in US dollars
    #[serde(rename = "usd")]
    pub value_usd: f64,

    /// Unix timestamp (seconds) when the value was captured
    #[serde(rename = "ts")]
    pub observed_at: i64,

    /// Which source, or blend of sources, produced the value
    #[serde(rename = "source")]
    pub provenance: String,
}

impl Quote {
    /// Stamp a freshly parsed upstream price with the current time.
    ///
    /// Rejects values no live market would quote (NaN, infinities, negatives).
    pub fn observed(provider: &'static str, symbol: &str, value_usd: f64) -> Result<Self> {
        if !value_usd.is_finite() || value_usd < 0.0 {
            return Err(OracleError::decode(
                provider,
                format!("invalid price {} for {}", value_usd, symbol),
            ));
        }

        Ok(Quote {
            symbol: symbol.to_string(),
            value_usd,
            observed_at: unix_now(),
            provenance: provider.to_string(),
        })
    }
}

/// An upstream price provider
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Provenance tag stamped on every quote this source produces
    fn name(&self) -> &'static str;

    /// Fetch a fresh quote for `symbol`
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}

/// Send `request` and return the body of a successful response
pub async fn fetch_body(provider: &'static str, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
    let response = request
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| OracleError::from_reqwest(provider, e))?;

    let body = response
        .bytes()
        .await
        .map_err(|e| OracleError::from_reqwest(provider, e))?;

    Ok(body.to_vec())
}

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
