use super::breakeven::compute_breakeven;
use crate::domain::config::ExitConfig;
use crate::domain::range::InvalidationFlag;
use crate::domain::trade::{ActiveTrade, ExitAction, ExitPriority, ExitSignal};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Everything the priority ladder needs beyond the trade itself and the
/// current price, gathered per tick by the orchestrator/monitor.
pub struct LadderContext {
    pub time_in_trade_min: i64,
    pub invalidation_flags: Vec<InvalidationFlag>,
    pub m15_bos_confirmed: bool,
    pub cvd_divergence_strength: Decimal,
    pub tape_pressure_against_position: Decimal,
    pub tp_reached: bool,
    pub effective_atr: Decimal,
    pub min_stop_distance: Decimal,
}

/// The 8-rule early-exit priority ladder, evaluated in order; the first
/// matching rule wins. Lower-priority rules never run once a higher one
/// fires, so a CRITICAL condition can never be masked by a LOW one. A rule
/// disabled via `exit_config.rule_enabled` is skipped entirely, falling
/// through to whatever rule would otherwise have come next.
pub fn check_exit(trade: &ActiveTrade, current_price: Decimal, ctx: &LadderContext, exit_config: &ExitConfig) -> Option<ExitSignal> {
    let profit_r = trade.profit_r(current_price);

    if ctx.m15_bos_confirmed && exit_config.rule_enabled("m15_bos_confirmed") {
        return Some(ExitSignal::new(ExitPriority::Critical, "m15_bos_confirmed", ExitAction::ExitNow, "M15 BOS confirmed against the trade"));
    }

    if ctx.invalidation_flags.contains(&InvalidationFlag::TwoBarsOutsideRange) && profit_r < dec!(0.8) && exit_config.rule_enabled("two_bars_outside_range") {
        return Some(ExitSignal::new(ExitPriority::High, "two_bars_outside_range", ExitAction::ExitNow, "two consecutive bars closed outside the range"));
    }
    if ctx.invalidation_flags.contains(&InvalidationFlag::VwapMomentumHigh) && profit_r < dec!(0.8) && exit_config.rule_enabled("vwap_momentum_high") {
        return Some(ExitSignal::new(ExitPriority::High, "vwap_momentum_high", ExitAction::ExitNow, "VWAP momentum breached the invalidation threshold"));
    }
    if ctx.invalidation_flags.contains(&InvalidationFlag::BbWidthExpansion) && profit_r < dec!(0.3) && exit_config.rule_enabled("bb_width_expansion") {
        return Some(ExitSignal::new(ExitPriority::Medium, "bb_width_expansion", ExitAction::ExitNow, "Bollinger-band width expanded past the invalidation threshold"));
    }

    if profit_r >= dec!(0.5) && ctx.time_in_trade_min <= 30 {
        let be = if exit_config.rule_enabled("breakeven_move") {
            compute_breakeven(
                trade.entry,
                trade.direction,
                current_price,
                ctx.effective_atr,
                ctx.min_stop_distance,
                exit_config.breakeven_management.offset_atr_mult,
            )
        } else {
            None
        };
        if let Some(price) = be {
            return Some(
                ExitSignal::new(ExitPriority::High, "breakeven_move", ExitAction::MoveSlToBreakeven, "profit target reached within the time window; moving SL to breakeven")
                    .with_breakeven_price(price),
            );
        }
        if current_price == trade.entry && exit_config.rule_enabled("breakeven_retrace") {
            return Some(ExitSignal::new(ExitPriority::High, "breakeven_retrace", ExitAction::ExitNow, "breakeven move rejected and price retraced to entry"));
        }
    }

    if ctx.time_in_trade_min >= 60 && profit_r.abs() < dec!(0.3) && !ctx.tp_reached && exit_config.rule_enabled("stagnation_energy_loss") {
        return Some(ExitSignal::new(ExitPriority::Medium, "stagnation_energy_loss", ExitAction::ExitNow, "trade has stagnated for over an hour without reaching TP"));
    }

    if ctx.cvd_divergence_strength >= dec!(0.7) && profit_r >= dec!(0.1) && exit_config.rule_enabled("cvd_divergence") {
        return Some(
            ExitSignal::new(ExitPriority::Low, "cvd_divergence", ExitAction::ExitAtProfit, "CVD divergence strength crossed 0.7 while in profit")
                .with_exit_at_profit_r(profit_r),
        );
    }

    if ctx.tape_pressure_against_position >= dec!(0.6) && exit_config.rule_enabled("tape_pressure_reversal") {
        if profit_r < Decimal::ZERO {
            return Some(ExitSignal::new(ExitPriority::Low, "tape_pressure_reversal", ExitAction::ExitNow, "tape pressure reversed against a losing position"));
        }
        if profit_r >= dec!(0.6) {
            return Some(
                ExitSignal::new(ExitPriority::Low, "tape_pressure_reversal", ExitAction::ExitAtProfit, "tape pressure reversed against a profitable position")
                    .with_exit_at_profit_r(dec!(0.6)),
            );
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{BreakevenConfig, RuleOverride};
    use crate::domain::range::{CriticalGapZones, ExpansionState, RangeKind, RangeStructure, TouchCount};
    use crate::domain::trading::OrderSide;
    use chrono::DateTime;
    use std::collections::HashMap;

    fn trade(entry: Decimal, sl: Decimal, tp: Decimal, direction: OrderSide) -> ActiveTrade {
        ActiveTrade {
            ticket: 1,
            symbol: "EURUSD".to_string(),
            strategy_id: "vwap_reversion".to_string(),
            direction,
            range_snapshot: RangeStructure {
                kind: RangeKind::Dynamic,
                high: dec!(110400),
                low: dec!(109800),
                mid: dec!(110100),
                width_atr: dec!(1),
                gaps: CriticalGapZones::new(dec!(110400), dec!(109800)),
                touch_count: TouchCount::default(),
                validated: true,
                nested: HashMap::new(),
                expansion_state: ExpansionState::Stable,
                invalidation_flags: vec![],
            },
            entry,
            sl,
            tp,
            entry_time: DateTime::UNIX_EPOCH,
            breakeven_moved: false,
            last_range_check: None,
            last_state_change: DateTime::UNIX_EPOCH,
        }
    }

    fn base_ctx() -> LadderContext {
        LadderContext {
            time_in_trade_min: 0,
            invalidation_flags: vec![],
            m15_bos_confirmed: false,
            cvd_divergence_strength: Decimal::ZERO,
            tape_pressure_against_position: Decimal::ZERO,
            tp_reached: false,
            effective_atr: dec!(2),
            min_stop_distance: dec!(0.1),
        }
    }

    #[test]
    fn m15_bos_wins_regardless_of_profit() {
        let t = trade(dec!(110000), dec!(109800), dec!(110400), OrderSide::Buy);
        let mut ctx = base_ctx();
        ctx.m15_bos_confirmed = true;
        let signal = check_exit(&t, dec!(110390), &ctx, &ExitConfig::default()).unwrap();
        assert_eq!(signal.priority, ExitPriority::Critical);
    }

    #[test]
    fn stagnation_exits_after_an_hour_near_flat() {
        let t = trade(dec!(110000), dec!(109800), dec!(110400), OrderSide::Buy);
        let mut ctx = base_ctx();
        ctx.time_in_trade_min = 65;
        let signal = check_exit(&t, dec!(110010), &ctx, &ExitConfig::default()).unwrap();
        assert_eq!(signal.priority, ExitPriority::Medium);
        assert_eq!(signal.reason_tag, "stagnation_energy_loss");
    }

    #[test]
    fn critical_masks_lower_priority_matches() {
        let t = trade(dec!(110000), dec!(109800), dec!(110400), OrderSide::Buy);
        let mut ctx = base_ctx();
        ctx.m15_bos_confirmed = true;
        ctx.time_in_trade_min = 65;
        let signal = check_exit(&t, dec!(110010), &ctx, &ExitConfig::default()).unwrap();
        assert_eq!(signal.priority, ExitPriority::Critical);
    }

    #[test]
    fn disabled_rule_falls_through_to_the_next_match() {
        let t = trade(dec!(110000), dec!(109800), dec!(110400), OrderSide::Buy);
        let mut ctx = base_ctx();
        ctx.time_in_trade_min = 65;
        let mut rules = HashMap::new();
        rules.insert("stagnation_energy_loss".to_string(), RuleOverride { enabled: Some(false) });
        let config = ExitConfig { early_exit_rules: rules, breakeven_management: BreakevenConfig::default() };

        assert!(check_exit(&t, dec!(110010), &ctx, &config).is_none());
        assert!(check_exit(&t, dec!(110010), &ctx, &ExitConfig::default()).is_some());
    }

    #[test]
    fn breakeven_move_carries_the_computed_price() {
        let t = trade(dec!(110000), dec!(109800), dec!(110400), OrderSide::Buy);
        let mut ctx = base_ctx();
        ctx.effective_atr = dec!(50);
        let signal = check_exit(&t, dec!(110300), &ctx, &ExitConfig::default()).unwrap();
        assert_eq!(signal.action, ExitAction::MoveSlToBreakeven);
        assert_eq!(signal.breakeven_price, Some(dec!(110005)));
    }
}
