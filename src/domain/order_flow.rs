use async_trait::async_trait;
use rust_decimal::Decimal;

/// Read-only view over live order-flow/tape microstructure, used for the
/// tape-pressure confirmation signal and the Exit Monitor's reversal check.
/// Out of scope as a concrete implementation; only this trait is specified.
#[async_trait]
pub trait OrderFlowSource: Send + Sync {
    /// Signed tape pressure in `[-1, 1]`: positive means buy-side aggression,
    /// negative sell-side. `None` if no recent tape data is available.
    async fn tape_pressure(&self, symbol: &str) -> Option<Decimal>;
}
