use crate::domain::config::RrConfig;
use crate::domain::indicators::Stochastic;
use crate::domain::range::RangeStructure;
use crate::domain::signal::EntrySignal;
use crate::domain::trading::Candle;
use rust_decimal::Decimal;

/// Everything a strategy evaluator needs, gathered by the orchestrator before
/// calling into the strategy engine. Strategies never fetch data themselves.
pub struct MarketContext<'a> {
    pub candles: &'a [Candle],
    pub range: &'a RangeStructure,
    pub current_price: Decimal,
    pub atr: Decimal,
    pub effective_atr: Decimal,
    pub rsi: Decimal,
    pub stochastic: Stochastic,
    pub vwap: Decimal,
    pub pdh: Option<Decimal>,
    pub pdl: Option<Decimal>,
    pub current_volume: Decimal,
    pub one_hour_mean_volume: Decimal,
    /// Order-flow confirmation, when available; `None` degrades gracefully
    /// (strategies that use it as a confidence bonus simply skip the bonus).
    pub tape_pressure: Option<Decimal>,
    pub rr: &'a RrConfig,
    pub session: &'a str,
    /// Computed once by the risk filter pipeline (C5) ahead of strategy
    /// evaluation and stamped onto every signal produced this pass.
    pub confluence_score: Decimal,
}

/// A pure function `(symbol, range, current_price, indicators, market_data) ->
/// EntrySignal?`. Implementations never mutate `ctx` and never perform I/O.
pub trait Strategy {
    fn id(&self) -> &'static str;
    fn evaluate(&self, ctx: &MarketContext) -> Option<EntrySignal>;
}
