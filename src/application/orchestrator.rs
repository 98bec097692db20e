use crate::application::error_handler::ErrorHandler;
use crate::application::mtf::{
    alignment_score, analyze_timeframe, classify_volatility_regime, primary_trend, trend_label, weights_for, Bias, CounterTrendAdjustment, TfConfidences,
    TrendLabel, TrendMemory,
};
use crate::application::retry::retry_with_backoff;
use crate::application::risk::{
    effective_atr as compute_effective_atr, run_risk_checks, session_blackout, ConfluenceInputs, RiskChecks, RiskPipelineInputs,
};
use crate::application::risk::{check_optional_source, check_required_source, RequiredSourceOutcome, SourceAttempt, TradeActivityInputs};
use crate::application::scorer::{score_and_select, RegimeWeights, ScoringContext, SessionPointsTable};
use crate::application::strategies::{all_strategies, MarketContext};
use crate::domain::broker::BrokerGateway;
use crate::domain::candle_source::CandleSource;
use crate::domain::config::main_config::MainConfig;
use crate::domain::config::RrConfig;
use crate::domain::indicators::adx::DEFAULT_ADX_PERIOD;
use crate::domain::indicators::atr::DEFAULT_ATR_PERIOD;
use crate::domain::indicators::bollinger::DEFAULT_BB_PERIOD;
use crate::domain::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::domain::indicators::stochastic::{DEFAULT_D_PERIOD, DEFAULT_K_PERIOD};
use crate::domain::indicators::{adx, atr, bollinger, rsi, stochastic, vwap, vwap_momentum_atr_per_bar};
use crate::domain::order_flow::OrderFlowSource;
use crate::domain::range::construct::{build_daily_range, build_dynamic_range, build_session_range};
use crate::domain::range::validity::{attach_nested, is_valid};
use crate::domain::range::RangeStructure;
use crate::domain::signal::{EntrySignal, StrategyScore};
use crate::domain::structure::{detect_bos_choch, detect_swings, label_swings, wick_asymmetry};
use crate::domain::trading::{Candle, OrderSide, Timeframe};
use chrono::{DateTime, Duration, Timelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration as StdDuration;

const H1_WINDOW: usize = 200;
const M15_WINDOW: usize = 200;
const M5_WINDOW: usize = 200;
const VWAP_MOMENTUM_WINDOW_BARS: usize = 20;
const ONE_HOUR_IN_M5_BARS: usize = 12;
const CONNECTION_RETRY_ATTEMPTS: usize = 3;
const CONNECTION_RETRY_BACKOFF: StdDuration = StdDuration::from_secs(5);

/// Everything the orchestrator talks to outside of pure computation.
pub struct OrchestratorDeps {
    pub candle_source: Arc<dyn CandleSource>,
    pub broker: Arc<dyn BrokerGateway>,
    pub order_flow: Arc<dyn OrderFlowSource>,
    pub trend_memory: Arc<TrendMemory>,
    pub error_handler: Arc<ErrorHandler>,
}

/// Human-readable session bucket a UTC instant falls into. The boundaries
/// aren't specified beyond the four named sessions used by the per-strategy
/// scoring table; picked to tile the day evenly (recorded as an open decision).
fn session_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=6 => "asian",
        7..=11 => "london",
        12..=16 => "ny",
        _ => "late_ny",
    }
}

fn session_start(now: DateTime<Utc>) -> (String, DateTime<Utc>) {
    let session = session_for_hour(now.hour()).to_string();
    let start_hour = match session.as_str() {
        "asian" => 0,
        "london" => 7,
        "ny" => 12,
        _ => 17,
    };
    let start = now.date_naive().and_hms_opt(start_hour, 0, 0).unwrap().and_utc();
    (session, start)
}

fn session_extremes(candles: &[Candle], since: DateTime<Utc>) -> Option<(Decimal, Decimal)> {
    let window: Vec<&Candle> = candles.iter().filter(|c| c.t >= since).collect();
    if window.is_empty() {
        return None;
    }
    let high = window.iter().map(|c| c.high).fold(window[0].high, Decimal::max);
    let low = window.iter().map(|c| c.low).fold(window[0].low, Decimal::min);
    Some((high, low))
}

/// Previous-day high/low, approximated as the extremes of the 24h window
/// ending 24h ago — this engine doesn't track broker calendar days directly.
fn previous_day_extremes(candles: &[Candle], now: DateTime<Utc>) -> Option<(Decimal, Decimal)> {
    let start = now - Duration::hours(48);
    let end = now - Duration::hours(24);
    let window: Vec<&Candle> = candles.iter().filter(|c| c.t >= start && c.t < end).collect();
    if window.is_empty() {
        return None;
    }
    let high = window.iter().map(|c| c.high).fold(window[0].high, Decimal::max);
    let low = window.iter().map(|c| c.low).fold(window[0].low, Decimal::min);
    Some((high, low))
}

/// Widens SL, shrinks TP, caps confidence, and re-clips R:R for a candidate
/// that trades against the primary trend (§4.7), per the strength-keyed
/// multipliers in `CounterTrendAdjustment`.
fn apply_counter_trend_adjustment(mut signal: EntrySignal, adjustment: CounterTrendAdjustment) -> EntrySignal {
    let risk = signal.risk_per_unit() * adjustment.sl_mult;
    let reward = ((signal.tp - signal.entry).abs() * adjustment.tp_mult).min(risk * adjustment.max_rr);

    match signal.direction {
        OrderSide::Buy => {
            signal.sl = signal.entry - risk;
            signal.tp = signal.entry + reward;
        }
        OrderSide::Sell => {
            signal.sl = signal.entry + risk;
            signal.tp = signal.entry - reward;
        }
    }
    signal.confidence = signal.confidence.min(adjustment.confidence_cap);
    signal.rr_ratio = if risk > Decimal::ZERO { reward / risk } else { Decimal::ZERO };
    signal
}

/// Builds a single timeframe's range trying session, then daily, then
/// dynamic detection; the first that succeeds wins.
fn detect_range(h1: &[Candle], session_start_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<RangeStructure> {
    let atr_h1 = atr(h1, DEFAULT_ATR_PERIOD);
    let vwap_h1 = vwap(h1);
    if atr_h1 <= Decimal::ZERO {
        return None;
    }

    if let Some((high, low)) = session_extremes(h1, session_start_at) {
        if let Ok(range) = build_session_range(high, low, h1, Some(session_start_at), atr_h1, vwap_h1, now) {
            return Some(range);
        }
    }
    if let Some((pdh, pdl)) = previous_day_extremes(h1, now) {
        if let Ok(range) = build_daily_range(pdh, pdl, Some(h1), atr_h1, vwap_h1, now) {
            return Some(range);
        }
    }
    build_dynamic_range(h1, Some(atr_h1), now).ok()
}

/// Snapshot of the session the analysis ran in, returned to the caller for
/// display/logging, not consumed downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session: String,
    pub blackout_reason: Option<&'static str>,
}

/// The orchestrator's assembled return value (§6).
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub range_detected: bool,
    pub range_structure: Option<RangeStructure>,
    pub risk_checks: Option<RiskChecks>,
    pub top_strategy: Option<StrategyScore>,
    pub early_exit_triggers: Vec<String>,
    pub session_context: SessionContext,
    pub warnings: Vec<String>,
    /// C8's weighted cross-timeframe agreement score (§4.7); `None` if the
    /// pass never reached the multi-timeframe read.
    pub alignment_score: Option<Decimal>,
}

/// Sequences C1 -> C3 -> C5 -> C6 -> C7 into one analysis pass per call.
pub struct Orchestrator {
    deps: OrchestratorDeps,
    main_config: MainConfig,
    rr_config: RrConfig,
    session_table: SessionPointsTable,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDeps, main_config: MainConfig, rr_config: RrConfig, session_table: SessionPointsTable) -> Self {
        Self { deps, main_config, rr_config, session_table }
    }

    pub async fn analyse(&self, symbol: &str, strategy_filter: Option<&str>, apply_risk_filters: bool, now: DateTime<Utc>) -> AnalysisResult {
        let mut warnings = Vec::new();

        // Step 2: session start.
        let (session, session_start_at) = session_start(now);
        let blackout_reason = session_blackout(now, &self.main_config.broker_timezone);
        let session_context = SessionContext { session: session.clone(), blackout_reason };

        let h1 = self.deps.candle_source.window(symbol, Timeframe::H1, H1_WINDOW).await;
        let m15 = self.deps.candle_source.window(symbol, Timeframe::M15, M15_WINDOW).await;
        let m5 = match retry_with_backoff(CONNECTION_RETRY_ATTEMPTS, CONNECTION_RETRY_BACKOFF, || async {
            let candles = self.deps.candle_source.window(symbol, Timeframe::M5, M5_WINDOW).await;
            if candles.is_empty() {
                None
            } else {
                Some(candles)
            }
        })
        .await
        {
            Some(candles) => candles,
            None => {
                self.deps.error_handler.record("mt5_connection_lost", std::time::Instant::now());
                warnings.push("no M5 data after 3 connection retries; treating required source as unavailable".to_string());
                Vec::new()
            }
        };

        // Step 3: range detection, session -> daily -> dynamic.
        let Some(mut h1_range) = detect_range(&h1, session_start_at, now) else {
            warnings.push("no range could be formed from any source".to_string());
            return AnalysisResult {
                range_detected: false,
                range_structure: None,
                risk_checks: None,
                top_strategy: None,
                early_exit_triggers: vec![],
                session_context,
                warnings,
                alignment_score: None,
            };
        };

        if let Some(m15_range) = detect_range(&m15, session_start_at, now) {
            let m5_range = detect_range(&m5, session_start_at, now);
            h1_range = attach_nested(h1_range, m15_range, m5_range);
        }

        // Step 4: data-quality check, warn-only.
        let min_candles = self.main_config.entry_filters.min_candles;
        let freshness = self.deps.candle_source.freshness(symbol, Timeframe::M5, now).await;
        let attempts = [SourceAttempt { name: "candle_source", freshness, candle_count: m5.len() }];
        let RequiredSourceOutcome { blocked: data_blocked, warnings: data_warnings, .. } =
            check_required_source(&attempts, Timeframe::M5, min_candles);
        warnings.extend(data_warnings);
        if data_blocked {
            warnings.push("proceeding with degraded data quality; results are informational only".to_string());
        }
        let Some(current) = m5.last().copied() else {
            return AnalysisResult {
                range_detected: true,
                range_structure: Some(h1_range),
                risk_checks: None,
                top_strategy: None,
                early_exit_triggers: vec![],
                session_context,
                warnings,
                alignment_score: None,
            };
        };
        let current_price = current.close;

        // Step 5: indicators, confirmation signals, MTF read.
        let atr_5m = atr(&m5, DEFAULT_ATR_PERIOD);
        let atr_h1 = atr(&h1, DEFAULT_ATR_PERIOD);

        // The range's own timeframe gets its own BOS/CHOCH read: a break level
        // inside [low, high] invalidates the range (§4.2/§8), same detectors
        // the exit side already runs against M15 (see exit/monitor.rs).
        let bos_break_level = {
            let swings = detect_swings(&h1);
            let labeled = label_swings(&swings);
            detect_bos_choch(&labeled, current_price, h1.len().saturating_sub(1), atr_h1).break_level
        };
        let range_valid = is_valid(&h1_range, bos_break_level);
        h1_range = h1_range.with_validated(range_valid);

        let bb_m5 = bollinger(&m5, DEFAULT_BB_PERIOD, 2.0);
        let bb_earlier = if m5.len() > DEFAULT_BB_PERIOD {
            bollinger(&m5[..m5.len() - DEFAULT_BB_PERIOD], DEFAULT_BB_PERIOD, 2.0).width()
        } else {
            bb_m5.width()
        };
        let effective_atr = compute_effective_atr(atr_5m, bb_m5.width(), h1_range.mid, self.main_config.effective_atr.bb_width_multiplier);
        let rsi_value = rsi(&m5, DEFAULT_RSI_PERIOD.min(m5.len().saturating_sub(1).max(1)));
        let stoch = stochastic(&m5, DEFAULT_K_PERIOD, DEFAULT_D_PERIOD);
        let vwap_m5 = vwap(&m5);
        let vwap_momentum = vwap_momentum_atr_per_bar(&m5, atr_5m, VWAP_MOMENTUM_WINDOW_BARS.min(m5.len().max(2)));

        let current_volume = current.volume;
        let one_hour_mean_volume = if m5.len() >= ONE_HOUR_IN_M5_BARS {
            m5[m5.len() - ONE_HOUR_IN_M5_BARS..].iter().map(|c| c.volume).sum::<Decimal>() / Decimal::from(ONE_HOUR_IN_M5_BARS as i64)
        } else if !m5.is_empty() {
            m5.iter().map(|c| c.volume).sum::<Decimal>() / Decimal::from(m5.len() as i64)
        } else {
            Decimal::ZERO
        };

        let (pdh, pdl) = previous_day_extremes(&h1, now).map(|(h, l)| (Some(h), Some(l))).unwrap_or((None, None));

        let tape_pressure = self.deps.order_flow.tape_pressure(symbol).await;
        if let Some(skip) = check_optional_source(tape_pressure.is_some(), "skip_order_flow_confirmation") {
            warnings.push(skip.to_string());
        }

        // Multi-timeframe analysis, stabilized through trend memory.
        let h4 = self.deps.candle_source.window(symbol, Timeframe::H4, H1_WINDOW).await;
        let m30 = self.deps.candle_source.window(symbol, Timeframe::M30, M15_WINDOW).await;
        let atr_h4 = atr(&h4, DEFAULT_ATR_PERIOD);
        let atr_m30 = atr(&m30, DEFAULT_ATR_PERIOD);
        let atr_m15 = atr(&m15, DEFAULT_ATR_PERIOD);
        let adx_h1 = adx(&h1, DEFAULT_ADX_PERIOD);

        let h4_stable = self.deps.trend_memory.push(Timeframe::H4, analyze_timeframe(&h4, atr_h4));
        let h1_stable = self.deps.trend_memory.push(Timeframe::H1, analyze_timeframe(&h1, atr_h1));
        let m30_stable = self.deps.trend_memory.push(Timeframe::M30, analyze_timeframe(&m30, atr_m30));
        let m15_stable = self.deps.trend_memory.push(Timeframe::M15, analyze_timeframe(&m15, atr_m15));
        let m5_stable = self.deps.trend_memory.push(Timeframe::M5, analyze_timeframe(&m5, atr_5m));

        let primary = primary_trend(h4_stable.clone(), h1_stable.clone());
        let trend_label_result = trend_label(primary, m5_stable.bias);

        let bb_width_ratio = if bb_earlier > Decimal::ZERO { bb_m5.width() / bb_earlier } else { Decimal::ONE };
        let regime = classify_volatility_regime(bb_width_ratio, adx_h1);
        let tf_weights = weights_for(regime);
        let confidences = TfConfidences { h4: h4_stable.confidence, h1: h1_stable.confidence, m30: m30_stable.confidence, m15: m15_stable.confidence, m5: m5_stable.confidence };
        let alignment = alignment_score(confidences, tf_weights, Decimal::ZERO);

        let direction = primary.bias.as_side().unwrap_or(match m5_stable.bias {
            Bias::Bearish => OrderSide::Sell,
            _ => OrderSide::Buy,
        });

        // Risk filter pipeline (C5), minus data-quality which ran above.
        let distance_from_vwap_atr = if atr_5m > Decimal::ZERO { (current_price - vwap_m5).abs() / atr_5m } else { Decimal::ZERO };
        let at_pdh_pdl = match (pdh, pdl) {
            (Some(pdh), Some(pdl)) => {
                let tol = effective_atr * dec!(0.1);
                (current_price - pdh).abs() <= tol || (current_price - pdl).abs() <= tol
            }
            _ => false,
        };
        let confluence_inputs = ConfluenceInputs {
            total_touches: h1_range.touch_count.total,
            distance_from_vwap_atr,
            in_critical_gap: h1_range.gaps.contains(current_price),
            at_pdh_pdl,
            rsi_extreme: rsi_value > dec!(70) || rsi_value < dec!(30),
            rejection_wick: wick_asymmetry(&current).abs() >= dec!(0.4),
            tape_pressure_present: tape_pressure.is_some(),
        };

        let news_within_60min = false; // no news feed wired yet; never blocks, see trade_activity_floor.
        let trade_activity = TradeActivityInputs {
            volume: current_volume,
            one_hour_mean_volume,
            price: current_price,
            vwap: vwap_m5,
            atr: atr_5m,
            minutes_since_last_trade: i64::MAX / 2,
            high_impact_news_within_60min: news_within_60min,
        };

        let pipeline_inputs = RiskPipelineInputs {
            confluence: confluence_inputs,
            confluence_weights: &self.main_config.entry_filters.confluence_weights,
            confluence_threshold: self.main_config.entry_filters.confluence_threshold,
            now_utc: now,
            broker_timezone: &self.main_config.broker_timezone,
            trade_activity,
            h1_range: &h1_range,
            current_price,
            direction,
            m5_candles: &m5,
            current_volume,
            one_hour_mean_volume,
            vwap_momentum_atr_per_bar: vwap_momentum,
            bos_break_level,
        };
        let risk_checks = run_risk_checks(&pipeline_inputs);

        let mut early_exit_triggers: Vec<String> = Vec::new();
        if let Some(reason) = risk_checks.session_block_reason {
            early_exit_triggers.push(format!("session blackout: {reason}"));
        }
        if risk_checks.false_range {
            early_exit_triggers.push(format!("false-range flags: {:?}", risk_checks.false_range_flags));
        }
        if !risk_checks.nested_alignment_ok {
            early_exit_triggers.extend(risk_checks.nested_alignment_reasons.clone());
        }
        if !risk_checks.range_valid {
            early_exit_triggers.push("range invalidated by a BOS break inside its bounds".to_string());
        }

        if apply_risk_filters && risk_checks.blocked {
            return AnalysisResult {
                range_detected: true,
                range_structure: Some(h1_range),
                risk_checks: Some(risk_checks),
                top_strategy: None,
                early_exit_triggers,
                session_context,
                warnings,
                alignment_score: Some(alignment),
            };
        }

        // Step 6: strategy engine + scorer.
        let range_for_strategies = h1_range
            .nested_for(Timeframe::M15)
            .and_then(|m15| m15.nested_for(Timeframe::M5))
            .cloned()
            .unwrap_or_else(|| h1_range.clone());

        let market_ctx = MarketContext {
            candles: &m5,
            range: &range_for_strategies,
            current_price,
            atr: atr_5m,
            effective_atr,
            rsi: rsi_value,
            stochastic: stoch,
            vwap: vwap_m5,
            pdh,
            pdl,
            current_volume,
            one_hour_mean_volume,
            tape_pressure,
            rr: &self.rr_config,
            session: &session,
            confluence_score: risk_checks.confluence.total,
        };

        let signals: Vec<_> = all_strategies().iter().filter_map(|strategy| strategy.evaluate(&market_ctx)).collect();
        let signals = match trend_label_result {
            TrendLabel::CounterTrend { adjustment } => signals.into_iter().map(|s| apply_counter_trend_adjustment(s, adjustment)).collect(),
            TrendLabel::TrendContinuation => signals,
        };

        let scoring_ctx = ScoringContext {
            m5_direction: m5_stable.bias.as_side(),
            m15_direction: m15_stable.bias.as_side(),
            h1_direction: h1_stable.bias.as_side(),
            order_flow_direction: tape_pressure.map(|p| if p >= Decimal::ZERO { OrderSide::Buy } else { OrderSide::Sell }),
            tape_pressure,
            adx_h1,
            adx_low_threshold: self.main_config.regime_detection.adx_low_threshold,
            adx_trending_threshold: self.main_config.regime_detection.adx_trending_threshold,
            session: session.clone(),
        };
        let regime_weights =
            RegimeWeights { low_adx: &self.main_config.dynamic_strategy_weighting.regimes.low_adx, normal: &self.main_config.dynamic_strategy_weighting.regimes.normal };

        let mut scored = score_and_select(signals, &scoring_ctx, &self.session_table, &regime_weights);
        if let Some(filter) = strategy_filter {
            scored.retain(|s| s.signal.strategy_id == filter);
        }
        let top_strategy = scored.into_iter().next();

        AnalysisResult {
            range_detected: true,
            range_structure: Some(h1_range),
            risk_checks: Some(risk_checks),
            top_strategy,
            early_exit_triggers,
            session_context,
            warnings,
            alignment_score: Some(alignment),
        }
    }
}
