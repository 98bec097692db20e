use crate::domain::trading::Candle;
use rust_decimal::Decimal;

/// VWAP over the whole `candles` window/session: `Sum(typical * v) / Sum(v)`.
/// Returns `0` if there is no volume in the window.
pub fn vwap(candles: &[Candle]) -> Decimal {
    let mut tp_vol = Decimal::ZERO;
    let mut vol = Decimal::ZERO;
    for c in candles {
        if c.volume <= Decimal::ZERO {
            continue;
        }
        tp_vol += c.typical_price() * c.volume;
        vol += c.volume;
    }
    if vol == Decimal::ZERO {
        Decimal::ZERO
    } else {
        tp_vol / vol
    }
}

/// Cumulative VWAP at every prefix of `candles`, same length as the input.
fn vwap_series(candles: &[Candle]) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(candles.len());
    let mut tp_vol = Decimal::ZERO;
    let mut vol = Decimal::ZERO;
    for c in candles {
        if c.volume > Decimal::ZERO {
            tp_vol += c.typical_price() * c.volume;
            vol += c.volume;
        }
        out.push(if vol == Decimal::ZERO {
            Decimal::ZERO
        } else {
            tp_vol / vol
        });
    }
    out
}

/// VWAP drift expressed in units of ATR per bar: the change in VWAP over the last
/// `bars` candles, normalized by ATR and by `(bars - 1)`. Returns `0` if there
/// isn't enough history or ATR is zero.
pub fn vwap_momentum_atr_per_bar(candles: &[Candle], atr: Decimal, bars: usize) -> Decimal {
    if bars < 2 || candles.len() < bars || atr <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let series = vwap_series(candles);
    let now = series[series.len() - 1];
    let then = series[series.len() - bars];
    let delta = now - then;
    delta / atr / Decimal::from((bars - 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn candle(close: f64, volume: f64) -> Candle {
        Candle::new(
            DateTime::<Utc>::UNIX_EPOCH,
            Decimal::try_from(close).unwrap(),
            Decimal::try_from(close).unwrap(),
            Decimal::try_from(close).unwrap(),
            Decimal::try_from(close).unwrap(),
            Decimal::try_from(volume).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn weighted_average() {
        let candles = vec![candle(100.0, 1000.0), candle(105.0, 2000.0)];
        let v = vwap(&candles);
        assert!((v - dec!(103.3333333333333333333333333)).abs() < dec!(0.0001));
    }

    #[test]
    fn zero_volume_window_is_zero() {
        let candles = vec![candle(100.0, 0.0)];
        assert_eq!(vwap(&candles), Decimal::ZERO);
    }

    #[test]
    fn momentum_is_zero_with_insufficient_history() {
        let candles = vec![candle(100.0, 1000.0)];
        assert_eq!(vwap_momentum_atr_per_bar(&candles, dec!(2), 5), Decimal::ZERO);
    }

    #[test]
    fn momentum_reflects_rising_vwap() {
        let candles: Vec<Candle> = (0..5).map(|i| candle(100.0 + i as f64, 1000.0)).collect();
        let m = vwap_momentum_atr_per_bar(&candles, dec!(2), 5);
        assert!(m > Decimal::ZERO);
    }
}
