use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open position as reported by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticket: u64,
    pub symbol: String,
    pub volume: Decimal,
    pub price_open: Decimal,
    pub sl: Decimal,
    pub tp: Decimal,
}

/// Static symbol metadata needed for order validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub point: Decimal,
    pub trade_stops_level: u32,
    pub select: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    /// Close (or partially close) an existing position at market.
    Deal,
    /// Modify SL/TP on an existing position.
    SlTp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub action: TradeAction,
    pub ticket: u64,
    pub symbol: String,
    pub volume: Option<Decimal>,
    pub sl: Option<Decimal>,
    pub tp: Option<Decimal>,
    pub deviation_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetCode {
    Done,
    Requote,
    Rejected,
    InvalidStops,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub retcode: RetCode,
    pub comment: String,
}

impl OrderResult {
    pub fn is_success(&self) -> bool {
        self.retcode == RetCode::Done
    }
}

/// Abstract exit-order contract: the broker/exchange execution gateway (out of
/// scope as a concrete implementation; only this trait is specified).
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    async fn positions_get(&self) -> Vec<Position>;
    async fn position_get(&self, ticket: u64) -> Option<Position>;
    async fn symbol_info(&self, symbol: &str) -> Option<SymbolInfo>;
    async fn symbol_select(&self, symbol: &str, enable: bool) -> bool;
    async fn order_send(&self, request: OrderRequest) -> OrderResult;
}
