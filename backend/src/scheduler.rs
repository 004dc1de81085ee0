//! Cycle driver
//!
//! Runs the aggregator once or on a fixed interval, writing each quote to the
//! output sink as pretty JSON and each failure to the diagnostic sink as an
//! `error:` line.

use crate::{
    error::{OracleError, Result},
    price_aggregator::PriceAggregator,
    types::Quote,
};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Longest supported period; longer requests are clamped to it
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// How often to run a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SingleShot,
    Periodic(Duration),
}

impl Mode {
    /// Absent or non-positive intervals mean a single cycle
    pub fn from_interval(interval_seconds: Option<i64>) -> Self {
        match interval_seconds {
            Some(secs) if secs > 0 => Mode::Periodic(Duration::from_secs(secs as u64).min(MAX_PERIOD)),
            _ => Mode::SingleShot,
        }
    }
}

pub struct Scheduler<O, D> {
    aggregator: PriceAggregator,
    symbol: String,
    output: O,
    diagnostics: D,
}

impl<O: Write, D: Write> Scheduler<O, D> {
    pub fn new(aggregator: PriceAggregator, symbol: &str, output: O, diagnostics: D) -> Self {
        Self {
            aggregator,
            symbol: symbol.to_string(),
            output,
            diagnostics,
        }
    }

    /// One cycle; the failure has already been reported when this returns `Err`
    pub async fn run_once(&mut self) -> Result<Quote> {
        let outcome = match self.aggregator.get_consensus_price(&self.symbol).await {
            Ok(quote) => self.emit(&quote).map(|_| quote),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            // Nowhere left to report a broken diagnostic stream
            let _ = writeln!(self.diagnostics, "error: {}", e);
        }

        outcome
    }

    /// Run a cycle every `period` until `shutdown` resolves.
    ///
    /// The first cycle fires one period after start. A cycle that is already
    /// running when `shutdown` resolves is allowed to finish. Returns the
    /// number of cycles run. Periods are clamped to `MAX_PERIOD`.
    pub async fn run_periodic(&mut self, period: Duration, shutdown: impl Future<Output = ()>) -> u64 {
        let period = period.clamp(Duration::from_millis(1), MAX_PERIOD);
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!("Publishing {} every {}s", self.symbol, period.as_secs());

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            cycles += 1;
            if self.run_once().await.is_err() {
                warn!("Cycle {} for {} failed, waiting for next tick", cycles, self.symbol);
            }
        }

        info!("Stopped after {} cycles", cycles);
        cycles
    }

    fn emit(&mut self, quote: &Quote) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.output, quote)?;
        writeln!(self.output)
            .and_then(|_| self.output.flush())
            .map_err(|e| OracleError::Output(serde_json::Error::io(e)))
    }

    #[cfg(test)]
    fn into_sinks(self) -> (O, D) {
        (self.output, self.diagnostics)
    }
}
