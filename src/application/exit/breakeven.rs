use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;

/// `entry ± offset_atr_mult * effective_atr`. Rejected (returns `None`) if the
/// candidate price is on the wrong side of `current_price` or closer than the
/// broker's minimum-stop distance — always a best-effort call, never an error.
pub fn compute_breakeven(
    entry: Decimal,
    direction: OrderSide,
    current_price: Decimal,
    effective_atr: Decimal,
    min_stop_distance: Decimal,
    offset_atr_mult: Decimal,
) -> Option<Decimal> {
    let offset = offset_atr_mult * effective_atr;
    let be_sl = match direction {
        OrderSide::Buy => entry + offset,
        OrderSide::Sell => entry - offset,
    };

    let wrong_side = match direction {
        OrderSide::Buy => be_sl >= current_price,
        OrderSide::Sell => be_sl <= current_price,
    };
    if wrong_side {
        return None;
    }

    if (current_price - be_sl).abs() < min_stop_distance {
        return None;
    }

    Some(be_sl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_breakeven_sits_above_entry() {
        let be = compute_breakeven(dec!(100), OrderSide::Buy, dec!(102), dec!(2), dec!(0.1), dec!(0.1)).unwrap();
        assert_eq!(be, dec!(100.2));
    }

    #[test]
    fn rejects_when_price_has_not_moved_past_breakeven() {
        assert!(compute_breakeven(dec!(100), OrderSide::Buy, dec!(100.1), dec!(2), dec!(0.1), dec!(0.1)).is_none());
    }

    #[test]
    fn rejects_when_closer_than_min_stop_distance() {
        assert!(compute_breakeven(dec!(100), OrderSide::Buy, dec!(100.25), dec!(2), dec!(0.5), dec!(0.1)).is_none());
    }
}
