use crate::domain::candle_source::CandleSource;
use crate::domain::trading::{Candle, Timeframe};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory candle store keyed by `(symbol, timeframe)`, each series kept
/// oldest-first. Meant for smoke tests and the demo binary, not production use.
#[derive(Clone, Default)]
pub struct MockCandleSource {
    series: Arc<RwLock<HashMap<(String, Timeframe), Vec<Candle>>>>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored series for `(symbol, tf)` with `candles`.
    pub async fn seed(&self, symbol: &str, tf: Timeframe, candles: Vec<Candle>) {
        self.series.write().await.insert((symbol.to_string(), tf), candles);
    }

    /// Appends a single completed candle to the series for `(symbol, tf)`.
    pub async fn push(&self, symbol: &str, tf: Timeframe, candle: Candle) {
        self.series.write().await.entry((symbol.to_string(), tf)).or_default().push(candle);
    }
}

#[async_trait]
impl CandleSource for MockCandleSource {
    async fn latest(&self, symbol: &str, tf: Timeframe) -> Option<Candle> {
        self.series.read().await.get(&(symbol.to_string(), tf)).and_then(|c| c.last().copied())
    }

    async fn window(&self, symbol: &str, tf: Timeframe, n: usize) -> Vec<Candle> {
        let guard = self.series.read().await;
        match guard.get(&(symbol.to_string(), tf)) {
            Some(c) if c.len() > n => c[c.len() - n..].to_vec(),
            Some(c) => c.clone(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn candle(t: DateTime<Utc>, c: rust_decimal::Decimal) -> Candle {
        Candle::new(t, c, c + dec!(1), c - dec!(1), c, dec!(100)).unwrap()
    }

    #[tokio::test]
    async fn window_returns_the_most_recent_n() {
        let source = MockCandleSource::new();
        for i in 0..5 {
            source.push("EURUSD", Timeframe::M5, candle(DateTime::UNIX_EPOCH + chrono::Duration::minutes(i), dec!(100))).await;
        }
        let window = source.window("EURUSD", Timeframe::M5, 3).await;
        assert_eq!(window.len(), 3);
    }

    #[tokio::test]
    async fn unseeded_symbol_returns_empty() {
        let source = MockCandleSource::new();
        assert!(source.window("EURUSD", Timeframe::M5, 10).await.is_empty());
        assert!(source.latest("EURUSD", Timeframe::M5).await.is_none());
    }
}
