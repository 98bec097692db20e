pub mod alignment;
pub mod analyzer;
pub mod primary_trend;
pub mod regime;
pub mod trend_memory;
pub mod types;

pub use alignment::{alignment_score, TfConfidences};
pub use analyzer::analyze_timeframe;
pub use primary_trend::{primary_trend, trend_label};
pub use regime::{classify_volatility_regime, weights_for, TfWeights};
pub use trend_memory::TrendMemory;
pub use types::{
    Bias, CounterTrendAdjustment, PrimaryTrend, Stability, StabilizedTf, TfAnalysis, TrendLabel, TrendStrength, VolatilityRegime,
};
