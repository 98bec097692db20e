use crate::domain::trading::Candle;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

pub const DEFAULT_BB_PERIOD: usize = 20;
pub const DEFAULT_BB_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

impl BollingerBands {
    pub fn width(&self) -> Decimal {
        self.upper - self.lower
    }
}

/// Bollinger bands over the last `n` closes: `sma +/- sigma * stddev`. Falls back
/// to a flat band (all three equal to the last close) if the window is too short.
pub fn bollinger(candles: &[Candle], n: usize, sigma: f64) -> BollingerBands {
    if candles.is_empty() {
        return BollingerBands {
            upper: Decimal::ZERO,
            middle: Decimal::ZERO,
            lower: Decimal::ZERO,
        };
    }
    let n = n.min(candles.len());
    let window = &candles[candles.len() - n..];

    let sma = window.iter().map(|c| c.close).sum::<Decimal>() / Decimal::from(n);

    if n < 2 {
        return BollingerBands {
            upper: sma,
            middle: sma,
            lower: sma,
        };
    }

    let sma_f = sma.to_f64().unwrap_or(0.0);
    let variance = window
        .iter()
        .map(|c| {
            let d = c.close.to_f64().unwrap_or(0.0) - sma_f;
            d * d
        })
        .sum::<f64>()
        / n as f64;
    let std = variance.sqrt();
    let band = Decimal::from_f64(std * sigma).unwrap_or(Decimal::ZERO);

    BollingerBands {
        upper: sma + band,
        middle: sma,
        lower: sma - band,
    }
}
