use super::types::{CriticalGapZones, ExpansionState, RangeKind, RangeStructure, TouchCount};
use crate::domain::errors::RangeError;
use crate::domain::indicators::{atr as atr_indicator, vwap as vwap_indicator};
use crate::domain::structure::swings::{detect_swings, SwingKind};
use crate::domain::trading::Candle;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

const TOUCH_TOLERANCE_PCT: Decimal = dec!(0.002);
const MIN_DYNAMIC_CANDLES: usize = 7; // 2*FRACTAL_RANGE + 1

/// Which window a touch count is scanned over — the engine must always know
/// this explicitly, since dynamic and session ranges clamp differently.
pub enum TouchClamp {
    SessionStart(DateTime<Utc>),
    LastHours(i64),
    FullWindow,
}

fn clamp_window(candles: &[Candle], clamp: &TouchClamp, now: DateTime<Utc>) -> usize {
    match clamp {
        TouchClamp::SessionStart(start) => candles.iter().position(|c| c.t >= *start).unwrap_or(candles.len()),
        TouchClamp::LastHours(h) => {
            let cutoff = now - chrono::Duration::hours(*h);
            candles.iter().position(|c| c.t >= cutoff).unwrap_or(candles.len())
        }
        TouchClamp::FullWindow => 0,
    }
}

/// Consecutive bars satisfying the same-side touch predicate count as a single
/// touch; the side resets once a bar no longer satisfies it.
pub fn count_touches(candles: &[Candle], high: Decimal, low: Decimal, clamp: TouchClamp, now: DateTime<Utc>) -> TouchCount {
    let start = clamp_window(candles, &clamp, now);
    let window = &candles[start..];
    let upper_tol = TOUCH_TOLERANCE_PCT * high.abs();
    let lower_tol = TOUCH_TOLERANCE_PCT * low.abs();

    let mut upper = 0usize;
    let mut lower = 0usize;
    let mut in_upper = false;
    let mut in_lower = false;
    for c in window {
        let upper_hit = (c.high - high).abs() <= upper_tol && c.close <= high + upper_tol;
        if upper_hit {
            if !in_upper {
                upper += 1;
            }
            in_upper = true;
        } else {
            in_upper = false;
        }

        let lower_hit = (c.low - low).abs() <= lower_tol && c.close >= low - lower_tol;
        if lower_hit {
            if !in_lower {
                lower += 1;
            }
            in_lower = true;
        } else {
            in_lower = false;
        }
    }
    TouchCount { total: upper + lower, upper, lower }
}

fn mid_of(low: Decimal, high: Decimal, vwap: Decimal) -> Decimal {
    if vwap > low && vwap < high {
        vwap
    } else {
        (low + high) / Decimal::TWO
    }
}

fn finish(
    kind: RangeKind,
    high: Decimal,
    low: Decimal,
    vwap: Decimal,
    atr: Decimal,
    touch_count: TouchCount,
) -> Result<RangeStructure, RangeError> {
    if high <= low {
        return Err(RangeError::NotFormed { reason: "high <= low" });
    }
    if atr <= Decimal::ZERO {
        return Err(RangeError::NotFormed { reason: "atr must be positive" });
    }
    Ok(RangeStructure {
        kind,
        high,
        low,
        mid: mid_of(low, high, vwap),
        width_atr: (high - low) / atr,
        gaps: CriticalGapZones::new(high, low),
        touch_count,
        validated: true, // validity (no-BOS-inside) is assessed separately, see validity.rs
        nested: HashMap::new(),
        expansion_state: ExpansionState::Forming,
        invalidation_flags: Vec::new(),
    })
}

/// Session range: requires the caller-supplied session extremes. Touch
/// counting scans from `session_start` if given, else the full window.
pub fn build_session_range(
    session_high: Decimal,
    session_low: Decimal,
    candles: &[Candle],
    session_start: Option<DateTime<Utc>>,
    atr: Decimal,
    vwap: Decimal,
    now: DateTime<Utc>,
) -> Result<RangeStructure, RangeError> {
    let clamp = match session_start {
        Some(start) => TouchClamp::SessionStart(start),
        None => TouchClamp::FullWindow,
    };
    let touch_count = count_touches(candles, session_high, session_low, clamp, now);
    finish(RangeKind::Session, session_high, session_low, vwap, atr, touch_count)
}

/// Daily range: requires previous-day extremes. Absent any candle history to
/// count touches against, the touch count is conservatively estimated at 2
/// (one bounce on each side).
pub fn build_daily_range(
    pdh: Decimal,
    pdl: Decimal,
    candles: Option<&[Candle]>,
    atr: Decimal,
    vwap: Decimal,
    now: DateTime<Utc>,
) -> Result<RangeStructure, RangeError> {
    let touch_count = match candles {
        Some(c) => count_touches(c, pdh, pdl, TouchClamp::FullWindow, now),
        None => TouchCount { total: 2, upper: 1, lower: 1 },
    };
    finish(RangeKind::Daily, pdh, pdl, vwap, atr, touch_count)
}

/// Dynamic range: inferred from the most recent swing high/low in the window.
/// ATR and VWAP are computed from the window when not supplied. Touch
/// counting is restricted to the last 48 hours.
pub fn build_dynamic_range(
    candles: &[Candle],
    atr_override: Option<Decimal>,
    now: DateTime<Utc>,
) -> Result<RangeStructure, RangeError> {
    if candles.len() < MIN_DYNAMIC_CANDLES {
        return Err(RangeError::InsufficientCandles {
            kind: "dynamic",
            need: MIN_DYNAMIC_CANDLES,
            have: candles.len(),
        });
    }
    let swings = detect_swings(candles);
    let swing_high = swings.iter().filter(|s| s.kind == SwingKind::High).max_by_key(|s| s.idx);
    let swing_low = swings.iter().filter(|s| s.kind == SwingKind::Low).max_by_key(|s| s.idx);
    let (high, low) = match (swing_high, swing_low) {
        (Some(h), Some(l)) => (h.price, l.price),
        _ => return Err(RangeError::NotFormed { reason: "no swing high/low pair found" }),
    };

    let atr = atr_override.unwrap_or_else(|| atr_indicator(candles, crate::domain::indicators::atr::DEFAULT_ATR_PERIOD));
    let vwap = vwap_indicator(candles);
    let touch_count = count_touches(candles, high, low, TouchClamp::LastHours(48), now);
    finish(RangeKind::Dynamic, high, low, vwap, atr, touch_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(t_offset_min: i64, o: f64, h: f64, l: f64, c: f64, v: f64) -> Candle {
        Candle::new(
            DateTime::UNIX_EPOCH + chrono::Duration::minutes(t_offset_min),
            Decimal::try_from(o).unwrap(),
            Decimal::try_from(h).unwrap(),
            Decimal::try_from(l).unwrap(),
            Decimal::try_from(c).unwrap(),
            Decimal::try_from(v).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn consecutive_touching_bars_count_once() {
        let candles = vec![
            candle(0, 99.0, 100.0, 98.0, 99.5, 100.0),
            candle(1, 99.5, 100.0, 99.0, 99.8, 100.0), // still touching upper
            candle(2, 95.0, 96.0, 94.0, 95.5, 100.0),  // away from boundary
        ];
        let now = DateTime::UNIX_EPOCH + chrono::Duration::minutes(10);
        let tc = count_touches(&candles, dec!(100), dec!(90), TouchClamp::FullWindow, now);
        assert_eq!(tc.upper, 1);
    }

    #[test]
    fn dynamic_range_detects_swing_high_low() {
        // Build 15 bars with a clear swing high at idx 7 (value 100) and swing low around idx 3 or so.
        let mut candles = Vec::new();
        let highs = [95.0, 96.0, 97.0, 98.0, 99.0, 99.5, 99.8, 100.0, 99.8, 99.5, 99.0, 98.0, 97.0, 96.0, 95.0];
        for (i, h) in highs.iter().enumerate() {
            candles.push(candle(i as i64, h - 3.0, *h, h - 5.0, h - 1.0, 100.0));
        }
        let now = DateTime::UNIX_EPOCH + chrono::Duration::minutes(20);
        let range = build_dynamic_range(&candles, Some(dec!(2.0)), now).unwrap();
        assert!(range.high > range.low);
        assert_eq!(range.kind, RangeKind::Dynamic);
    }

    #[test]
    fn rejects_when_high_not_above_low() {
        let now = DateTime::UNIX_EPOCH;
        let result = build_session_range(dec!(100), dec!(105), &[], None, dec!(2), dec!(102), now);
        assert!(result.is_err());
    }
}
