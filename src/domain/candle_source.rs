use crate::domain::trading::{Candle, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only view over the external multi-timeframe candle store (C1).
///
/// Implementations are expected to be process-wide singletons with explicit
/// init/teardown and are safe to share behind an `Arc` across the orchestrator and
/// the exit monitor.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// The most recent completed candle for `(symbol, timeframe)`, if any.
    async fn latest(&self, symbol: &str, tf: Timeframe) -> Option<Candle>;

    /// The last `n` completed candles for `(symbol, timeframe)`, oldest first.
    async fn window(&self, symbol: &str, tf: Timeframe, n: usize) -> Vec<Candle>;

    /// How long ago the latest candle closed, relative to `now`. `None` if no data.
    async fn freshness(&self, symbol: &str, tf: Timeframe, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.latest(symbol, tf)
            .await
            .map(|c| now.signed_duration_since(c.t))
    }
}
