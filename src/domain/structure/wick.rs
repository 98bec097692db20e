use crate::domain::trading::Candle;
use rust_decimal::Decimal;

/// `(upper - lower) / (upper + lower)`, clamped to `[-1, 1]`; `0` if both wicks
/// are zero. Positive >= 0.4 reads as upper-rejection (bearish pressure);
/// negative <= -0.4 reads as lower-rejection (bullish pressure).
pub fn wick_asymmetry(candle: &Candle) -> Decimal {
    let body_top = candle.open.max(candle.close);
    let body_bottom = candle.open.min(candle.close);
    let upper = candle.high - body_top;
    let lower = body_bottom - candle.low;
    let total = upper + lower;
    if total == Decimal::ZERO {
        Decimal::ZERO
    } else {
        ((upper - lower) / total).clamp(-Decimal::ONE, Decimal::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn candle(o: f64, h: f64, l: f64, c: f64) -> Candle {
        Candle::new(
            DateTime::UNIX_EPOCH,
            Decimal::try_from(o).unwrap(),
            Decimal::try_from(h).unwrap(),
            Decimal::try_from(l).unwrap(),
            Decimal::try_from(c).unwrap(),
            dec!(100),
        )
        .unwrap()
    }

    #[test]
    fn pure_doji_with_no_wicks_is_zero() {
        let c = candle(100.0, 100.0, 100.0, 100.0);
        assert_eq!(wick_asymmetry(&c), Decimal::ZERO);
    }

    #[test]
    fn long_upper_wick_is_positive() {
        let c = candle(100.0, 110.0, 99.0, 100.5);
        let a = wick_asymmetry(&c);
        assert!(a >= dec!(0.4));
    }

    #[test]
    fn long_lower_wick_is_negative() {
        let c = candle(100.5, 101.0, 90.0, 100.0);
        let a = wick_asymmetry(&c);
        assert!(a <= dec!(-0.4));
    }
}
