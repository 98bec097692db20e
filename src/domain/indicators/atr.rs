use crate::domain::trading::Candle;
use rust_decimal::Decimal;

pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Rolling mean of true range over the last `n` candles. Returns `0` if the window
/// is too short to compute (fewer than 2 candles, since true range needs a previous
/// close).
pub fn atr(candles: &[Candle], n: usize) -> Decimal {
    if candles.len() < 2 {
        return Decimal::ZERO;
    }
    let n = n.min(candles.len() - 1);
    if n == 0 {
        return Decimal::ZERO;
    }
    let start = candles.len() - n;
    let mut sum = Decimal::ZERO;
    for i in start..candles.len() {
        let prev_close = candles[i - 1].close;
        sum += candles[i].true_range(Some(prev_close));
    }
    sum / Decimal::from(n)
}
