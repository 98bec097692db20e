use crate::domain::trading::Candle;
use rust_decimal::Decimal;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Wilder's RSI over the last `n` closes. Returns `50` (neutral) if the window is
/// too short.
pub fn rsi(candles: &[Candle], n: usize) -> Decimal {
    if candles.len() < n + 1 {
        return Decimal::from(50);
    }

    let start = candles.len() - (n + 1);
    let window = &candles[start..];

    let mut avg_gain = Decimal::ZERO;
    let mut avg_loss = Decimal::ZERO;
    for i in 1..=n {
        let change = window[i].close - window[i - 1].close;
        if change > Decimal::ZERO {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= Decimal::from(n);
    avg_loss /= Decimal::from(n);

    if avg_loss == Decimal::ZERO {
        return Decimal::from(100);
    }
    let rs = avg_gain / avg_loss;
    Decimal::from(100) - (Decimal::from(100) / (Decimal::ONE + rs))
}
