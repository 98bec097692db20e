use crate::domain::broker::{BrokerGateway, OrderRequest, OrderResult, Position, RetCode, SymbolInfo, TradeAction};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory broker double: positions are seeded by the caller and mutated by
/// `order_send` the same way a real gateway would react to a `Deal`/`SlTp`
/// request. Always accepts orders; there is no simulated rejection path.
#[derive(Clone, Default)]
pub struct MockBroker {
    positions: Arc<RwLock<HashMap<u64, Position>>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_position(&self, position: Position) {
        self.positions.write().await.insert(position.ticket, position);
    }
}

#[async_trait]
impl BrokerGateway for MockBroker {
    async fn positions_get(&self) -> Vec<Position> {
        self.positions.read().await.values().cloned().collect()
    }

    async fn position_get(&self, ticket: u64) -> Option<Position> {
        self.positions.read().await.get(&ticket).cloned()
    }

    async fn symbol_info(&self, _symbol: &str) -> Option<SymbolInfo> {
        Some(SymbolInfo {
            point: rust_decimal_macros::dec!(0.0001),
            trade_stops_level: 10,
            select: true,
            visible: true,
        })
    }

    async fn symbol_select(&self, _symbol: &str, _enable: bool) -> bool {
        true
    }

    async fn order_send(&self, request: OrderRequest) -> OrderResult {
        let mut positions = self.positions.write().await;
        match request.action {
            TradeAction::Deal => {
                positions.remove(&request.ticket);
                info!(ticket = request.ticket, "mock broker closed position");
            }
            TradeAction::SlTp => {
                if let Some(position) = positions.get_mut(&request.ticket) {
                    if let Some(sl) = request.sl {
                        position.sl = sl;
                    }
                    if let Some(tp) = request.tp {
                        position.tp = tp;
                    }
                }
            }
        }
        OrderResult { retcode: RetCode::Done, comment: "mock fill".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(ticket: u64) -> Position {
        Position { ticket, symbol: "EURUSD".to_string(), volume: dec!(0.01), price_open: dec!(1.1), sl: dec!(1.09), tp: dec!(1.12) }
    }

    #[tokio::test]
    async fn deal_closes_the_position() {
        let broker = MockBroker::new();
        broker.seed_position(position(1)).await;
        let result = broker
            .order_send(OrderRequest { action: TradeAction::Deal, ticket: 1, symbol: "EURUSD".to_string(), volume: None, sl: None, tp: None, deviation_points: 20 })
            .await;
        assert!(result.is_success());
        assert!(broker.position_get(1).await.is_none());
    }

    #[tokio::test]
    async fn sl_tp_updates_the_position_in_place() {
        let broker = MockBroker::new();
        broker.seed_position(position(1)).await;
        broker
            .order_send(OrderRequest {
                action: TradeAction::SlTp,
                ticket: 1,
                symbol: "EURUSD".to_string(),
                volume: None,
                sl: Some(dec!(1.1)),
                tp: None,
                deviation_points: 20,
            })
            .await;
        assert_eq!(broker.position_get(1).await.unwrap().sl, dec!(1.1));
    }
}
