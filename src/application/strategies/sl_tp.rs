use crate::domain::config::RrConfig;
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;

pub fn calculate_stop_loss(
    entry: Decimal,
    direction: OrderSide,
    stop_atr_mult: Decimal,
    session_stop_tightener: Decimal,
    effective_atr: Decimal,
) -> Decimal {
    let offset = stop_atr_mult * session_stop_tightener * effective_atr;
    match direction {
        OrderSide::Buy => entry - offset,
        OrderSide::Sell => entry + offset,
    }
}

pub fn calculate_take_profit(
    entry: Decimal,
    sl: Decimal,
    direction: OrderSide,
    target_rr: Decimal,
    session_rr_multiplier: Decimal,
    session_max_rr: Decimal,
) -> Decimal {
    let risk = (entry - sl).abs();
    let rr = (target_rr * session_rr_multiplier).min(session_max_rr);
    let offset = risk * rr;
    match direction {
        OrderSide::Buy => entry + offset,
        OrderSide::Sell => entry - offset,
    }
}

/// Looks up the strategy's and session's R:R config and derives `(sl, tp)`.
/// `None` if the strategy/session is unconfigured or the session is disabled.
pub fn sl_tp_for(
    strategy_id: &str,
    session: &str,
    rr: &RrConfig,
    entry: Decimal,
    direction: OrderSide,
    effective_atr: Decimal,
) -> Option<(Decimal, Decimal)> {
    let strat = rr.strategies.get(strategy_id)?;
    let sess = rr.sessions.get(session)?;
    if !sess.enabled {
        return None;
    }
    let sl = calculate_stop_loss(entry, direction, strat.default_stop_atr_mult, sess.stop_tightener, effective_atr);
    let tp = calculate_take_profit(entry, sl, direction, strat.target, sess.rr_multiplier, sess.max_rr);
    Some((sl, tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{SessionRr, StrategyRr};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn buy_sl_below_entry_tp_above() {
        let sl = calculate_stop_loss(dec!(100), OrderSide::Buy, dec!(1.5), dec!(1.0), dec!(2.0));
        assert_eq!(sl, dec!(97));
        let tp = calculate_take_profit(dec!(100), sl, OrderSide::Buy, dec!(2.0), dec!(1.0), dec!(5.0));
        assert_eq!(tp, dec!(106));
    }

    #[test]
    fn sl_tp_for_respects_session_max_rr_cap() {
        let mut strategies = HashMap::new();
        strategies.insert(
            "vwap_reversion".to_string(),
            StrategyRr { min: dec!(1), target: dec!(10), max: dec!(20), default_stop_atr_mult: dec!(1), default_tp_atr_mult: dec!(1) },
        );
        let mut sessions = HashMap::new();
        sessions.insert("ny".to_string(), SessionRr { enabled: true, rr_multiplier: dec!(1), stop_tightener: dec!(1), max_rr: dec!(2) });
        let rr = RrConfig { strategies, sessions };
        let (sl, tp) = sl_tp_for("vwap_reversion", "ny", &rr, dec!(100), OrderSide::Buy, dec!(2)).unwrap();
        assert_eq!(sl, dec!(98));
        assert_eq!(tp, dec!(104)); // capped at max_rr=2, not target=10
    }
}
