use super::confluence::{score_confluence, ConfluenceBreakdown, ConfluenceInputs};
use super::session_filter::session_blackout;
use super::trade_activity::{trade_activity_floor, TradeActivityInputs};
use crate::domain::config::main_config::ConfluenceWeights;
use crate::domain::range::{check_false_range, is_valid, FalseRangeFlag, RangeStructure};
use crate::domain::trading::{Candle, OrderSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Everything the risk filter pipeline needs for a single `analyse()` pass,
/// gathered by the orchestrator ahead of the call.
pub struct RiskPipelineInputs<'a> {
    pub confluence: ConfluenceInputs,
    pub confluence_weights: &'a ConfluenceWeights,
    pub confluence_threshold: Decimal,
    pub now_utc: DateTime<Utc>,
    pub broker_timezone: &'a str,
    pub trade_activity: TradeActivityInputs,
    pub h1_range: &'a RangeStructure,
    pub current_price: Decimal,
    pub direction: OrderSide,
    pub m5_candles: &'a [Candle],
    pub current_volume: Decimal,
    pub one_hour_mean_volume: Decimal,
    pub vwap_momentum_atr_per_bar: Decimal,
    pub bos_break_level: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskChecks {
    pub confluence: ConfluenceBreakdown,
    pub session_blocked: bool,
    pub session_block_reason: Option<&'static str>,
    pub trade_activity_ok: bool,
    pub trade_activity_reasons: Vec<&'static str>,
    pub nested_alignment_ok: bool,
    pub nested_alignment_reasons: Vec<String>,
    pub false_range: bool,
    pub false_range_flags: Vec<FalseRangeFlag>,
    pub range_valid: bool,
    pub blocked: bool,
}

/// Runs every C5 check except data-quality (which the orchestrator runs
/// earlier, against the raw candle fetch, and only ever warns).
pub fn run_risk_checks(inputs: &RiskPipelineInputs) -> RiskChecks {
    let confluence = score_confluence(&inputs.confluence, inputs.confluence_weights, inputs.confluence_threshold);

    let session_block_reason = session_blackout(inputs.now_utc, inputs.broker_timezone);
    let session_blocked = session_block_reason.is_some();

    let (trade_activity_ok, trade_activity_reasons) = trade_activity_floor(&inputs.trade_activity);

    let (nested_alignment_ok, nested_alignment_reasons) =
        super::nested_alignment::nested_alignment(inputs.h1_range, inputs.current_price, inputs.direction);

    let (false_range, false_range_flags) =
        check_false_range(inputs.m5_candles, inputs.current_volume, inputs.one_hour_mean_volume, inputs.vwap_momentum_atr_per_bar);

    let range_valid = is_valid(inputs.h1_range, inputs.bos_break_level);

    let blocked =
        !confluence.passed || session_blocked || !trade_activity_ok || !nested_alignment_ok || false_range || !range_valid;

    RiskChecks {
        confluence,
        session_blocked,
        session_block_reason,
        trade_activity_ok,
        trade_activity_reasons,
        nested_alignment_ok,
        nested_alignment_reasons,
        false_range,
        false_range_flags,
        range_valid,
        blocked,
    }
}
