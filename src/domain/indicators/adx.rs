use crate::domain::trading::Candle;
use rust_decimal::Decimal;

pub const DEFAULT_ADX_PERIOD: usize = 14;

/// Wilder's Average Directional Index over the last `n` candles. Returns `0`
/// (no trend) if the window is too short to compute a directional-movement
/// average.
pub fn adx(candles: &[Candle], n: usize) -> Decimal {
    if candles.len() < n + 1 {
        return Decimal::ZERO;
    }

    let start = candles.len() - (n + 1);
    let window = &candles[start..];

    let mut plus_dm_sum = Decimal::ZERO;
    let mut minus_dm_sum = Decimal::ZERO;
    let mut tr_sum = Decimal::ZERO;

    for i in 1..window.len() {
        let up_move = window[i].high - window[i - 1].high;
        let down_move = window[i - 1].low - window[i].low;

        let plus_dm = if up_move > down_move && up_move > Decimal::ZERO { up_move } else { Decimal::ZERO };
        let minus_dm = if down_move > up_move && down_move > Decimal::ZERO { down_move } else { Decimal::ZERO };

        plus_dm_sum += plus_dm;
        minus_dm_sum += minus_dm;
        tr_sum += window[i].true_range(Some(window[i - 1].close));
    }

    if tr_sum == Decimal::ZERO {
        return Decimal::ZERO;
    }

    let plus_di = plus_dm_sum / tr_sum * Decimal::from(100);
    let minus_di = minus_dm_sum / tr_sum * Decimal::from(100);
    let di_sum = plus_di + minus_di;
    if di_sum == Decimal::ZERO {
        return Decimal::ZERO;
    }
    (plus_di - minus_di).abs() / di_sum * Decimal::from(100)
}
