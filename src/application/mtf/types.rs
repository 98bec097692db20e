use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;

/// Directional bias a single timeframe analysis settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl Bias {
    pub fn as_side(self) -> Option<OrderSide> {
        match self {
            Bias::Bullish => Some(OrderSide::Buy),
            Bias::Bearish => Some(OrderSide::Sell),
            Bias::Neutral => None,
        }
    }
}

/// One timeframe's read of the market: H4 bias, H1 context, M30 setup, M15
/// trigger, or M5 execution — structurally identical, named by role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfAnalysis {
    pub bias: Bias,
    pub confidence: Decimal,
    pub bos: bool,
    pub choch: bool,
}

/// Trend-memory stabilization verdict over the last 3 labels for a timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Unstable,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizedTf {
    pub stability: Stability,
    pub bias: Bias,
    pub confidence: Decimal,
}

/// Strength of the H4+H1 primary trend, used to look up the counter-trend
/// risk-adjustment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryTrend {
    pub bias: Bias,
    pub strength: TrendStrength,
}

/// Volatility regime driving the timeframe weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityRegime {
    Low,
    Medium,
    High,
}

/// Risk-adjustment multipliers applied to a counter-trend signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterTrendAdjustment {
    pub sl_mult: Decimal,
    pub tp_mult: Decimal,
    pub max_rr: Decimal,
    pub confidence_cap: Decimal,
}

impl TrendStrength {
    pub fn counter_trend_adjustment(self) -> CounterTrendAdjustment {
        use rust_decimal_macros::dec;
        match self {
            TrendStrength::Strong => CounterTrendAdjustment { sl_mult: dec!(1.25), tp_mult: dec!(0.50), max_rr: dec!(0.50), confidence_cap: dec!(60) },
            TrendStrength::Moderate => {
                CounterTrendAdjustment { sl_mult: dec!(1.15), tp_mult: dec!(0.75), max_rr: dec!(0.75), confidence_cap: dec!(60) }
            }
            TrendStrength::Weak => CounterTrendAdjustment { sl_mult: dec!(1.00), tp_mult: dec!(1.00), max_rr: dec!(1.00), confidence_cap: dec!(60) },
        }
    }
}

/// Whether a lower-timeframe signal aligns with or opposes the primary trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendLabel {
    CounterTrend { adjustment: CounterTrendAdjustment },
    TrendContinuation,
}
