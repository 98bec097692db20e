use crate::domain::signal::{AdxContext, EntrySignal, StrategyScore};
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Per-strategy x per-session points table, `[0, 20]` per entry.
pub type SessionPointsTable = HashMap<String, HashMap<String, Decimal>>;

/// Per-strategy regime weight tables (`low_adx` / `normal`), each summing to ~1.0.
#[derive(Debug, Clone)]
pub struct RegimeWeights<'a> {
    pub low_adx: &'a HashMap<String, Decimal>,
    pub normal: &'a HashMap<String, Decimal>,
}

/// Directional read from the multi-timeframe analyzer and order-flow feed,
/// gathered once per `analyse()` pass and shared across every candidate.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext {
    pub m5_direction: Option<OrderSide>,
    pub m15_direction: Option<OrderSide>,
    pub h1_direction: Option<OrderSide>,
    pub order_flow_direction: Option<OrderSide>,
    pub tape_pressure: Option<Decimal>,
    pub adx_h1: Decimal,
    pub adx_low_threshold: Decimal,
    pub adx_trending_threshold: Decimal,
    pub session: String,
}

fn classify_adx(adx: Decimal, low_threshold: Decimal, trending_threshold: Decimal) -> AdxContext {
    if adx < low_threshold {
        AdxContext::LowAdx
    } else if adx > trending_threshold {
        AdxContext::Trending
    } else {
        AdxContext::Normal
    }
}

fn entry_points(confidence: Decimal) -> Decimal {
    (dec!(0.4) * confidence).min(dec!(40))
}

fn mtf_points(signal_direction: OrderSide, ctx: &ScoringContext) -> Decimal {
    let matches = [ctx.m5_direction, ctx.m15_direction, ctx.h1_direction]
        .into_iter()
        .filter(|d| *d == Some(signal_direction))
        .count();
    match matches {
        0 => Decimal::ZERO,
        1 => dec!(6),
        2 => dec!(12),
        _ => dec!(20),
    }
}

fn order_flow_points(signal_direction: OrderSide, ctx: &ScoringContext) -> Decimal {
    let base = match ctx.order_flow_direction {
        Some(d) if d == signal_direction => dec!(12),
        None => dec!(6),
        Some(_) => Decimal::ZERO,
    };
    let tape_bonus = match ctx.tape_pressure {
        Some(pressure) => {
            let same_side = match signal_direction {
                OrderSide::Buy => pressure > Decimal::ZERO,
                OrderSide::Sell => pressure < Decimal::ZERO,
            };
            if same_side {
                (pressure.abs() * dec!(8)).min(dec!(8))
            } else {
                Decimal::ZERO
            }
        }
        None => Decimal::ZERO,
    };
    (base + tape_bonus).min(dec!(20))
}

fn session_points(strategy_id: &str, session: &str, table: &SessionPointsTable) -> Decimal {
    table.get(strategy_id).and_then(|sessions| sessions.get(session)).copied().unwrap_or(Decimal::ZERO)
}

fn regime_weight(strategy_id: &str, adx_context: AdxContext, weights: &RegimeWeights) -> Option<Decimal> {
    match adx_context {
        AdxContext::LowAdx => weights.low_adx.get(strategy_id).copied(),
        AdxContext::Normal => weights.normal.get(strategy_id).copied(),
        AdxContext::Trending => None,
    }
}

/// Scores every candidate signal, gates range scalps out entirely when
/// `ADX(H1) > 25`, resolves buy/sell conflicts, and returns the top 2 by
/// weighted score.
pub fn score_and_select(
    signals: Vec<EntrySignal>,
    ctx: &ScoringContext,
    session_table: &SessionPointsTable,
    regime_weights: &RegimeWeights,
) -> Vec<StrategyScore> {
    let adx_context = classify_adx(ctx.adx_h1, ctx.adx_low_threshold, ctx.adx_trending_threshold);
    if adx_context == AdxContext::Trending {
        return Vec::new();
    }

    let mut scored: Vec<StrategyScore> = signals
        .into_iter()
        .filter_map(|signal| {
            let weight = regime_weight(&signal.strategy_id, adx_context, regime_weights)?;
            let entry_pts = entry_points(signal.confidence);
            let mtf_pts = mtf_points(signal.direction, ctx);
            let order_flow_pts = order_flow_points(signal.direction, ctx);
            let session_pts = session_points(&signal.strategy_id, &ctx.session, session_table);
            let total = entry_pts + mtf_pts + order_flow_pts + session_pts;
            let weighted = total * weight;
            Some(StrategyScore {
                signal,
                total,
                entry_pts,
                mtf_pts,
                order_flow_pts,
                session_pts,
                weighted,
                adx_context,
            })
        })
        .collect();

    resolve_conflicts(&mut scored);
    scored.sort_by(|a, b| b.weighted.cmp(&a.weighted));
    scored.truncate(2);
    scored
}

/// If both buy and sell candidates remain and their best weighted scores
/// differ by > 20, drop the losing side entirely; otherwise keep one of each.
fn resolve_conflicts(scored: &mut Vec<StrategyScore>) {
    let best_buy = scored.iter().filter(|s| s.signal.direction == OrderSide::Buy).map(|s| s.weighted).max();
    let best_sell = scored.iter().filter(|s| s.signal.direction == OrderSide::Sell).map(|s| s.weighted).max();

    if let (Some(buy), Some(sell)) = (best_buy, best_sell) {
        if (buy - sell).abs() > dec!(20) {
            let keep = if buy > sell { OrderSide::Buy } else { OrderSide::Sell };
            scored.retain(|s| s.signal.direction == keep);
        } else {
            let mut kept_buy = false;
            let mut kept_sell = false;
            scored.sort_by(|a, b| b.weighted.cmp(&a.weighted));
            scored.retain(|s| match s.signal.direction {
                OrderSide::Buy if !kept_buy => {
                    kept_buy = true;
                    true
                }
                OrderSide::Sell if !kept_sell => {
                    kept_sell = true;
                    true
                }
                _ => false,
            });
        }
    }
}
