use crate::domain::trading::Candle;
use rust_decimal::Decimal;

/// Exponential moving average of closes, `alpha = 2/(n+1)`, seeded with the first
/// close in the window. Returns `0` if there are no candles.
pub fn ema(candles: &[Candle], n: usize) -> Decimal {
    if candles.is_empty() {
        return Decimal::ZERO;
    }
    let alpha = Decimal::from(2) / Decimal::from(n as i64 + 1);
    let mut value = candles[0].close;
    for c in &candles[1..] {
        value = alpha * c.close + (Decimal::ONE - alpha) * value;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn candle(c: f64) -> Candle {
        Candle::new(
            DateTime::UNIX_EPOCH,
            Decimal::try_from(c).unwrap(),
            Decimal::try_from(c).unwrap(),
            Decimal::try_from(c).unwrap(),
            Decimal::try_from(c).unwrap(),
            dec!(1),
        )
        .unwrap()
    }

    #[test]
    fn constant_series_is_stable() {
        let candles: Vec<Candle> = (0..10).map(|_| candle(100.0)).collect();
        assert_eq!(ema(&candles, 5), dec!(100));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(ema(&[], 5), Decimal::ZERO);
    }
}
