use crate::domain::trading::{Candle, OrderSide};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const SWEEP_LOOKBACK: usize = 20;
pub const SWEEP_CONFIRM_BARS: usize = 3;

/// A detected and validated liquidity sweep: a brief violation of a swing extreme
/// followed by close back inside, scored for how likely the reversal is real.
///
/// Combines what the source implementation split across `detect_sweep` and
/// `validate_sweep` into one two-phase function (see Open Questions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub direction: OrderSide,
    pub sweep_idx: usize,
    pub sweep_price: Decimal,
    pub depth_atr: Decimal,
    pub volume_ratio: Decimal,
    pub follow_through_atr: Decimal,
    pub fake: bool,
    pub confidence: Decimal,
    pub validated: bool,
}

/// Scans backward from the end of `candles` for the most recent bar (within the
/// last `SWEEP_CONFIRM_BARS` positions) that swept a swing extreme from the
/// preceding `SWEEP_LOOKBACK` bars, then validates it against whatever
/// confirmation bars follow it in the slice (zero if the sweep bar is the very
/// last candle — detection just happened this tick).
pub fn detect_and_validate_sweep(candles: &[Candle], atr: Decimal) -> Option<Sweep> {
    if atr <= Decimal::ZERO || candles.len() < 2 {
        return None;
    }
    let last_idx = candles.len() - 1;
    let earliest_candidate = last_idx.saturating_sub(SWEEP_CONFIRM_BARS);

    for sweep_idx in (earliest_candidate..=last_idx).rev() {
        let ext_start = sweep_idx.saturating_sub(SWEEP_LOOKBACK);
        if ext_start == sweep_idx {
            continue; // no prior bars to form extrema from
        }
        let ext_window = &candles[ext_start..sweep_idx];
        let swing_high = ext_window.iter().map(|c| c.high).fold(ext_window[0].high, Decimal::max);
        let swing_low = ext_window.iter().map(|c| c.low).fold(ext_window[0].low, Decimal::min);
        let bar = &candles[sweep_idx];

        let threshold = dec!(0.15) * atr;
        let bull = bar.high > swing_high + threshold && bar.close < swing_high;
        let bear = bar.low < swing_low - threshold && bar.close > swing_low;
        if !bull && !bear {
            continue;
        }

        let direction = if bull { OrderSide::Buy } else { OrderSide::Sell };
        let sweep_price = if bull { bar.high } else { bar.low };
        let depth_atr = if bull {
            (bar.high - swing_high) / atr
        } else {
            (swing_low - bar.low) / atr
        };

        let vol_mean = ext_window.iter().map(|c| c.volume).sum::<Decimal>()
            / Decimal::from(ext_window.len() as i64);
        let volume_ratio = if vol_mean > Decimal::ZERO {
            bar.volume / vol_mean
        } else {
            Decimal::ZERO
        };

        let confirm_end = (sweep_idx + 1 + SWEEP_CONFIRM_BARS).min(candles.len());
        let confirm = &candles[sweep_idx + 1..confirm_end];

        let (follow_through_atr, fake) = if confirm.is_empty() {
            (Decimal::ZERO, false)
        } else {
            let confirm_close = confirm.last().unwrap().close;
            let ft = if bull {
                (sweep_price - confirm_close) / atr
            } else {
                (confirm_close - sweep_price) / atr
            };
            let fake = if bull {
                confirm.iter().any(|c| c.close > swing_high)
            } else {
                confirm.iter().any(|c| c.close < swing_low)
            };
            (ft, fake)
        };

        let mut confidence = dec!(50);
        if volume_ratio >= dec!(1.5) {
            confidence += dec!(20);
        } else if volume_ratio >= dec!(1.2) {
            confidence += dec!(10);
        }
        if follow_through_atr >= dec!(0.3) {
            confidence += dec!(25);
        } else if follow_through_atr >= dec!(0.15) {
            confidence += dec!(15);
        }
        if follow_through_atr <= dec!(-0.2) {
            confidence -= dec!(20);
        }
        if fake {
            confidence -= dec!(30);
        }
        if depth_atr >= dec!(0.3) {
            confidence += dec!(10);
        } else if depth_atr >= dec!(0.2) {
            confidence += dec!(5);
        }
        confidence = confidence.clamp(Decimal::ZERO, Decimal::from(100));

        let validated = follow_through_atr >= dec!(0.15) && !fake;

        return Some(Sweep {
            direction,
            sweep_idx,
            sweep_price,
            depth_atr,
            volume_ratio,
            follow_through_atr,
            fake,
            confidence,
            validated,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn candle(o: f64, h: f64, l: f64, c: f64, v: f64) -> Candle {
        Candle::new(
            DateTime::UNIX_EPOCH,
            Decimal::try_from(o).unwrap(),
            Decimal::try_from(h).unwrap(),
            Decimal::try_from(l).unwrap(),
            Decimal::try_from(c).unwrap(),
            Decimal::try_from(v).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn bullish_sweep_validated_with_high_confidence() {
        // 5 bars of context (swing high 105 formed at bar index 4), then the sweep
        // bar, then a confirmation bar that closes away from the sweep.
        let mut candles = vec![
            candle(100.0, 101.0, 99.0, 100.0, 1000.0),
            candle(100.0, 102.0, 99.0, 100.5, 1000.0),
            candle(100.5, 103.0, 100.0, 101.0, 1000.0),
            candle(101.0, 104.0, 100.0, 102.0, 1000.0),
            candle(102.0, 105.0, 101.0, 103.0, 1000.0), // swing high 105
        ];
        // Sweep bar: high=106.5 (>105+0.15*2=105.3), close=104 (<105), volume=1.6x mean(1000)
        candles.push(candle(103.0, 106.5, 103.5, 104.0, 1600.0));
        // Confirmation bar: closes further away from the swept level.
        candles.push(candle(104.0, 104.5, 101.0, 101.5, 1000.0));

        let sweep = detect_and_validate_sweep(&candles, dec!(2.0)).unwrap();
        assert_eq!(sweep.direction, OrderSide::Buy);
        assert!((sweep.depth_atr - dec!(0.75)).abs() < dec!(0.01));
        assert!(sweep.confidence >= dec!(70));
        assert!(sweep.validated);
    }

    #[test]
    fn no_sweep_when_extreme_not_violated() {
        let candles: Vec<Candle> = (0..10)
            .map(|i| candle(100.0, 101.0, 99.0, 100.0 + i as f64 * 0.01, 1000.0))
            .collect();
        assert!(detect_and_validate_sweep(&candles, dec!(2.0)).is_none());
    }
}
