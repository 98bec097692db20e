use super::types::{FalseRangeFlag, InvalidationFlag, RangeStructure};
use crate::domain::structure::swings::detect_swings;
use crate::domain::trading::Candle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Cumulative signed volume: `+v` on an up-close bar, `-v` on a down-close bar,
/// `0` on a doji close, running over the whole slice.
pub fn cumulative_volume_delta(candles: &[Candle]) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(candles.len());
    let mut cum = Decimal::ZERO;
    for c in candles {
        cum += if c.close > c.open {
            c.volume
        } else if c.close < c.open {
            -c.volume
        } else {
            Decimal::ZERO
        };
        out.push(cum);
    }
    out
}

/// Compares the trend across the last two swing extrema of the same kind
/// against the CVD trend over the same span. `0` if the trends agree (no
/// divergence) or there isn't enough swing history; otherwise
/// `clamp((|Δprice%| + |ΔCVD%|) * 10, 0, 1)`.
pub fn cvd_divergence_strength(candles: &[Candle]) -> Decimal {
    if candles.len() < 2 {
        return Decimal::ZERO;
    }
    let swings = detect_swings(candles);
    let Some(last_kind) = swings.last().map(|s| s.kind) else {
        return Decimal::ZERO;
    };
    let same_kind: Vec<_> = swings.iter().filter(|s| s.kind == last_kind).collect();
    if same_kind.len() < 2 {
        return Decimal::ZERO;
    }
    let a = same_kind[same_kind.len() - 2];
    let b = same_kind[same_kind.len() - 1];

    let cvd = cumulative_volume_delta(candles);
    let cvd_a = cvd[a.idx];
    let cvd_b = cvd[b.idx];

    let price_trend = (b.price - a.price).signum();
    let cvd_trend = (cvd_b - cvd_a).signum();
    if price_trend == Decimal::ZERO || cvd_trend == Decimal::ZERO || price_trend == cvd_trend {
        return Decimal::ZERO;
    }

    let price_pct = if a.price != Decimal::ZERO { (b.price - a.price) / a.price } else { Decimal::ZERO };
    let cvd_pct = if cvd_a != Decimal::ZERO { (cvd_b - cvd_a) / cvd_a.abs() } else { Decimal::ZERO };

    ((price_pct.abs() + cvd_pct.abs()) * Decimal::TEN).clamp(Decimal::ZERO, Decimal::ONE)
}

/// Invalidation requires >= 2 of the 4 flags. `m15_bos_confirmed` is supplied
/// by the caller since it comes from the M15 structure detector, not this window.
pub fn check_invalidation(
    range: &RangeStructure,
    candles: &[Candle],
    vwap_momentum_atr_per_bar: Decimal,
    bb_width_now: Decimal,
    bb_width_earlier: Decimal,
    m15_bos_confirmed: bool,
) -> (bool, Vec<InvalidationFlag>) {
    let mut flags = Vec::new();

    if candles.len() >= 2 {
        let last_two_outside = candles[candles.len() - 2..]
            .iter()
            .all(|c| c.close < range.low || c.close > range.high);
        if last_two_outside {
            flags.push(InvalidationFlag::TwoBarsOutsideRange);
        }
    }
    if vwap_momentum_atr_per_bar.abs() > dec!(0.2) {
        flags.push(InvalidationFlag::VwapMomentumHigh);
    }
    if bb_width_earlier > Decimal::ZERO && bb_width_now > bb_width_earlier * dec!(1.5) {
        flags.push(InvalidationFlag::BbWidthExpansion);
    }
    if m15_bos_confirmed {
        flags.push(InvalidationFlag::M15BosConfirmed);
    }

    (flags.len() >= 2, flags)
}

fn mean_body(candles: &[Candle]) -> Decimal {
    if candles.is_empty() {
        return Decimal::ZERO;
    }
    candles.iter().map(|c| c.body()).sum::<Decimal>() / Decimal::from(candles.len() as i64)
}

/// Imbalanced consolidation ("false range"): requires >= 2 of the 4 flags.
pub fn check_false_range(
    candles: &[Candle],
    current_volume: Decimal,
    one_hour_mean_volume: Decimal,
    vwap_momentum_atr_per_bar: Decimal,
) -> (bool, Vec<FalseRangeFlag>) {
    let mut flags = Vec::new();

    if one_hour_mean_volume > Decimal::ZERO && current_volume > one_hour_mean_volume * dec!(1.15) {
        flags.push(FalseRangeFlag::VolumeIncreasing);
    }
    if vwap_momentum_atr_per_bar.abs() > dec!(0.1) {
        flags.push(FalseRangeFlag::VwapMomentumHigh);
    }

    let n = candles.len();
    if n >= 16 {
        let recent = mean_body(&candles[n - 5..]);
        let earlier = mean_body(&candles[n - 16..n - 11]);
        if earlier > Decimal::ZERO && recent > earlier * dec!(1.5) {
            flags.push(FalseRangeFlag::CandleBodyExpansion);
        }
    }
    if cvd_divergence_strength(candles) > dec!(0.6) {
        flags.push(FalseRangeFlag::CvdDivergence);
    }

    (flags.len() >= 2, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::range::types::{CriticalGapZones, ExpansionState, RangeKind, TouchCount};
    use chrono::DateTime;
    use std::collections::HashMap;

    fn range() -> RangeStructure {
        RangeStructure {
            kind: RangeKind::Dynamic,
            high: dec!(100),
            low: dec!(95),
            mid: dec!(97.5),
            width_atr: dec!(2),
            gaps: CriticalGapZones::new(dec!(100), dec!(95)),
            touch_count: TouchCount::default(),
            validated: true,
            nested: HashMap::new(),
            expansion_state: ExpansionState::Stable,
            invalidation_flags: vec![],
        }
    }

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
    fn two_flags_invalidate() {
        let r = range();
        let candles = vec![candle(101.0, 102.0, 100.5, 101.5, 100.0), candle(101.5, 102.5, 101.0, 102.0, 100.0)];
        let (invalidated, flags) = check_invalidation(&r, &candles, dec!(0.25), dec!(1), dec!(1), false);
        assert!(invalidated);
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn single_flag_does_not_invalidate() {
        let r = range();
        let candles = vec![candle(99.0, 99.5, 98.5, 99.0, 100.0)];
        let (invalidated, _) = check_invalidation(&r, &candles, dec!(0.05), dec!(1), dec!(1), false);
        assert!(!invalidated);
    }

    #[test]
    fn volume_and_momentum_spike_trips_the_false_range_trap() {
        let candles = vec![candle(100.0, 100.5, 99.5, 100.2, 100.0); 20];
        let (is_false_range, flags) = check_false_range(&candles, dec!(200), dec!(100), dec!(0.3));
        assert!(is_false_range);
        assert!(flags.contains(&FalseRangeFlag::VolumeIncreasing));
        assert!(flags.contains(&FalseRangeFlag::VwapMomentumHigh));
    }

    #[test]
    fn quiet_consolidation_does_not_trip_the_false_range_trap() {
        let candles = vec![candle(100.0, 100.2, 99.9, 100.0, 100.0); 20];
        let (is_false_range, flags) = check_false_range(&candles, dec!(101), dec!(100), dec!(0.02));
        assert!(!is_false_range);
        assert!(flags.is_empty());
    }
}
