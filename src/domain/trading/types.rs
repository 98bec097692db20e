use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A single completed OHLCV candle.
///
/// `t` is the bar's open time; the period is implicit from the timeframe it was
/// fetched for. Invariants (checked by `Candle::new`, trusted elsewhere):
/// `low <= min(open, close) <= max(open, close) <= high`, `volume >= 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub t: chrono::DateTime<chrono::Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    pub fn new(
        t: chrono::DateTime<chrono::Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Option<Self> {
        let body_lo = open.min(close);
        let body_hi = open.max(close);
        if low > body_lo || body_hi > high || volume < Decimal::ZERO {
            return None;
        }
        Some(Self {
            t,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    pub fn true_range(&self, prev_close: Option<Decimal>) -> Decimal {
        let hl = self.high - self.low;
        match prev_close {
            Some(pc) => hl.max((self.high - pc).abs()).max((self.low - pc).abs()),
            None => hl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::UNIX_EPOCH
    }

    #[test]
    fn rejects_invalid_ohlc() {
        assert!(Candle::new(ts(), dec!(10), dec!(9), dec!(1), dec!(10), dec!(1)).is_none());
        assert!(Candle::new(ts(), dec!(10), dec!(11), dec!(1), dec!(10), dec!(-1)).is_none());
    }

    #[test]
    fn accepts_valid_ohlc() {
        let c = Candle::new(ts(), dec!(10), dec!(11), dec!(9), dec!(10.5), dec!(100)).unwrap();
        assert_eq!(c.body(), dec!(0.5));
        assert!(c.is_bullish());
    }

    #[test]
    fn true_range_uses_prev_close_when_gapping() {
        let c = Candle::new(ts(), dec!(10), dec!(11), dec!(9), dec!(10), dec!(1)).unwrap();
        // Gap up from a prev close far below the bar's low.
        assert_eq!(c.true_range(Some(dec!(5))), dec!(6));
    }
}
