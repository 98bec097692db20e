use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A candidate entry produced by one strategy evaluator (C6), before scoring (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySignal {
    pub strategy_id: String,
    pub direction: OrderSide,
    pub entry: Decimal,
    pub sl: Decimal,
    pub tp: Decimal,
    pub confidence: Decimal,
    pub confluence_score: Decimal,
    pub rr_ratio: Decimal,
    pub lot_size: Decimal,
    pub reason: String,
}

impl EntrySignal {
    /// Builds a signal, computing `rr_ratio` and checking the buy/sell SL/TP
    /// ordering invariant. Returns `None` if the invariant doesn't hold.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        strategy_id: impl Into<String>,
        direction: OrderSide,
        entry: Decimal,
        sl: Decimal,
        tp: Decimal,
        confidence: Decimal,
        confluence_score: Decimal,
        lot_size: Decimal,
        reason: impl Into<String>,
    ) -> Option<Self> {
        let valid = match direction {
            OrderSide::Buy => sl < entry && entry < tp,
            OrderSide::Sell => tp < entry && entry < sl,
        };
        if !valid {
            return None;
        }
        let risk = (entry - sl).abs();
        if risk == Decimal::ZERO {
            return None;
        }
        let rr_ratio = (tp - entry).abs() / risk;
        Some(Self {
            strategy_id: strategy_id.into(),
            direction,
            entry,
            sl,
            tp,
            confidence,
            confluence_score,
            rr_ratio,
            lot_size,
            reason: reason.into(),
        })
    }

    pub fn risk_per_unit(&self) -> Decimal {
        (self.entry - self.sl).abs()
    }
}

/// ADX regime bucket used to gate and reweight strategy scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdxContext {
    LowAdx,
    Normal,
    Trending,
}

impl AdxContext {
    pub fn from_adx_h1(adx: Decimal) -> Self {
        if adx < Decimal::from(15) {
            AdxContext::LowAdx
        } else if adx > Decimal::from(25) {
            AdxContext::Trending
        } else {
            AdxContext::Normal
        }
    }
}

/// A scored candidate produced by the scorer (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyScore {
    pub signal: EntrySignal,
    pub total: Decimal,
    pub entry_pts: Decimal,
    pub mtf_pts: Decimal,
    pub order_flow_pts: Decimal,
    pub session_pts: Decimal,
    pub weighted: Decimal,
    pub adx_context: AdxContext,
}
