use crate::domain::trading::{Candle, OrderSide};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const FVG_LOOKBACK: usize = 10;
const FVG_MIN_WIDTH_ATR_MULT: Decimal = dec!(0.1);

/// A three-candle imbalance: the wick of the middle candle never traded through
/// the gap between its neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FairValueGap {
    pub direction: OrderSide,
    pub upper: Decimal,
    pub lower: Decimal,
    pub width_atr: Decimal,
    pub bars_ago: usize,
}

/// Scans the last `FVG_LOOKBACK` candle triplets for a qualifying gap and
/// returns the most recent one, if any. A triplet `(i-1, i, i+1)` at the end of
/// `candles` qualifies as bullish when `low[i-1] > high[i+1]` with
/// `width >= 0.1 * atr`; mirrored for bearish.
pub fn detect_fvg(candles: &[Candle], atr: Decimal) -> Option<FairValueGap> {
    if atr <= Decimal::ZERO || candles.len() < 3 {
        return None;
    }
    let last_idx = candles.len() - 1;
    let min_width = FVG_MIN_WIDTH_ATR_MULT * atr;
    let earliest_i = last_idx.saturating_sub(FVG_LOOKBACK).max(1);

    for i in (earliest_i..last_idx).rev() {
        let prev = &candles[i - 1];
        let next = &candles[i + 1];

        if prev.low > next.high {
            let width = prev.low - next.high;
            if width >= min_width {
                return Some(FairValueGap {
                    direction: OrderSide::Buy,
                    upper: prev.low,
                    lower: next.high,
                    width_atr: width / atr,
                    bars_ago: last_idx - i,
                });
            }
        }
        if prev.high < next.low {
            let width = next.low - prev.high;
            if width >= min_width {
                return Some(FairValueGap {
                    direction: OrderSide::Sell,
                    upper: next.low,
                    lower: prev.high,
                    width_atr: width / atr,
                    bars_ago: last_idx - i,
                });
            }
        }
    }
    None
}
