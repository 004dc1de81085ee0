//! Price Aggregator
//!
//! Reconciles the answers of two independent price sources into one quote.
//!
//! # Precedence
//! ```text
//! first ✓  second ✓  →  blend: mean price, latest timestamp, "avg(first,second)"
//! first ✓  second ✗  →  first's quote, untouched
//! first ✗  second ✓  →  second's quote, untouched
//! first ✗  second ✗  →  BothSourcesFailed(first error, second error)
//! ```
//!
//! There is no quorum, weighting or outlier rejection. Losing one source only
//! downgrades the provenance to that single source.

use crate::{
    error::{OracleError, Result},
    types::{PriceSource, Quote},
};
use tracing::{debug, error, warn};

/// Price aggregator over exactly two sources
pub struct PriceAggregator {
    first: Box<dyn PriceSource>,
    second: Box<dyn PriceSource>,
}

impl PriceAggregator {
    /// The first source wins timestamp ties and names the blended symbol
    pub fn new(first: Box<dyn PriceSource>, second: Box<dyn PriceSource>) -> Self {
        Self { first, second }
    }

    /// Run one reconciliation cycle for `symbol`.
    ///
    /// Both sources are queried concurrently and both outcomes are awaited
    /// before the precedence policy is applied.
    ///
    /// # Errors
    /// * `BothSourcesFailed` - neither source produced a quote
    pub async fn get_consensus_price(&self, symbol: &str) -> Result<Quote> {
        debug!("Fetching consensus price for {}", symbol);

        let (first, second) = tokio::join!(
            self.first.fetch_quote(symbol),
            self.second.fetch_quote(symbol),
        );

        for (source, outcome) in [(self.first.name(), &first), (self.second.name(), &second)] {
            match outcome {
                Ok(quote) => debug!("{} price for {}: ${}", source, symbol, quote.value_usd),
                Err(e) => warn!("{} error for {}: {}", source, symbol, e),
            }
        }

        let consensus = reconcile(first, second);
        match &consensus {
            Ok(quote) => debug!(
                "Consensus price for {}: ${} (source {})",
                symbol, quote.value_usd, quote.provenance
            ),
            Err(e) => error!("No price available for {}: {}", symbol, e),
        }

        consensus
    }
}

/// Apply the precedence policy to two source outcomes
pub fn reconcile(first: Result<Quote>, second: Result<Quote>) -> Result<Quote> {
    match (first, second) {
        (Ok(a), Ok(b)) => Ok(blend(&a, &b)),
        (Ok(quote), Err(_)) | (Err(_), Ok(quote)) => Ok(quote),
        (Err(first), Err(second)) => Err(OracleError::BothSourcesFailed {
            first: Box::new(first),
            second: Box::new(second),
        }),
    }
}

/// Mean of both prices, stamped with the later observation
fn blend(a: &Quote, b: &Quote) -> Quote {
    let observed_at = if b.observed_at > a.observed_at {
        b.observed_at
    } else {
        a.observed_at
    };

    Quote {
        symbol: a.symbol.clone(),
        value_usd: (a.value_usd + b.value_usd) / 2.0,
        observed_at,
        provenance: format!("avg({},{})", a.provenance, b.provenance),
    }
}
