use crate::domain::order_flow::OrderFlowSource;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fixed/seeded tape pressure per symbol, for tests and the demo binary. A
/// symbol with no seeded value reports `None`, same as a feed with no data yet.
#[derive(Clone, Default)]
pub struct MockOrderFlow {
    pressure: Arc<RwLock<HashMap<String, Decimal>>>,
}

impl MockOrderFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_pressure(&self, symbol: &str, pressure: Decimal) {
        self.pressure.write().await.insert(symbol.to_string(), pressure);
    }
}

#[async_trait]
impl OrderFlowSource for MockOrderFlow {
    async fn tape_pressure(&self, symbol: &str) -> Option<Decimal> {
        self.pressure.read().await.get(symbol).copied()
    }
}
