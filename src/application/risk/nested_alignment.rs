use crate::domain::range::RangeStructure;
use crate::domain::trading::{OrderSide, Timeframe};
use rust_decimal::Decimal;

/// M5 must nest in M15 (structural, already enforced at range-construction
/// time) and sit on the price-side consistent with `direction`; M15 must nest
/// in H1. `h1` is expected to already carry its nested M15/M5 (see
/// `domain::range::validity::attach_nested`).
pub fn nested_alignment(h1: &RangeStructure, current_price: Decimal, direction: OrderSide) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();

    let Some(m15) = h1.nested_for(Timeframe::M15) else {
        reasons.push("m15 range is not nested inside h1".to_string());
        return (false, reasons);
    };
    let Some(m5) = m15.nested_for(Timeframe::M5) else {
        reasons.push("m5 range is not nested inside m15".to_string());
        return (false, reasons);
    };

    let third = m5.width() / Decimal::from(3);
    let in_lower_third = current_price <= m5.low + third;
    let in_upper_third = current_price >= m5.high - third;
    let side_ok = match direction {
        OrderSide::Buy => in_lower_third,
        OrderSide::Sell => in_upper_third,
    };
    if !side_ok {
        let side = match direction {
            OrderSide::Buy => "lower third",
            OrderSide::Sell => "upper third",
        };
        reasons.push(format!("price is not in the m5 range's {side} for a {direction} entry"));
    }

    (reasons.is_empty(), reasons)
}
