use crate::domain::trading::Candle;
use rust_decimal::Decimal;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stochastic {
    pub k: Decimal,
    pub d: Decimal,
}

fn raw_k(window: &[Candle]) -> Decimal {
    let hh = window.iter().map(|c| c.high).fold(window[0].high, Decimal::max);
    let ll = window.iter().map(|c| c.low).fold(window[0].low, Decimal::min);
    let range = hh - ll;
    if range == Decimal::ZERO {
        return Decimal::from(50);
    }
    let close = window.last().unwrap().close;
    (close - ll) / range * Decimal::from(100)
}

/// %K(k) and %D(d) = SMA(%K, d). Returns `{k: 50, d: 50}` (neutral) if the window
/// is too short for even one %K value.
pub fn stochastic(candles: &[Candle], k_period: usize, d_period: usize) -> Stochastic {
    if candles.len() < k_period {
        return Stochastic {
            k: Decimal::from(50),
            d: Decimal::from(50),
        };
    }

    let available_k_values = (candles.len() - k_period + 1).min(d_period);
    let mut k_values = Vec::with_capacity(available_k_values);
    for i in 0..available_k_values {
        let end = candles.len() - i;
        let start = end - k_period;
        k_values.push(raw_k(&candles[start..end]));
    }

    let k = k_values[0];
    let d = k_values.iter().sum::<Decimal>() / Decimal::from(k_values.len());
    Stochastic { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn candle(h: f64, l: f64, c: f64) -> Candle {
        Candle::new(
            DateTime::UNIX_EPOCH,
            Decimal::try_from(c).unwrap(),
            Decimal::try_from(h).unwrap(),
            Decimal::try_from(l).unwrap(),
            Decimal::try_from(c).unwrap(),
            dec!(100),
        )
        .unwrap()
    }

    #[test]
    fn too_short_is_neutral() {
        let candles = vec![candle(10.0, 9.0, 9.5)];
        let s = stochastic(&candles, 14, 3);
        assert_eq!(s.k, dec!(50));
        assert_eq!(s.d, dec!(50));
    }

    #[test]
    fn close_at_high_is_100() {
        let candles: Vec<Candle> = (0..14)
            .map(|i| candle(10.0 + i as f64, i as f64, 10.0 + i as f64))
            .collect();
        let s = stochastic(&candles, 14, 3);
        assert_eq!(s.k, dec!(100));
    }
}
