use super::types::{ExpansionState, RangeStructure};
use crate::domain::trading::Timeframe;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Valid iff a BOS break level either doesn't exist or lies outside `[low, high]`.
pub fn is_valid(range: &RangeStructure, bos_break_level: Option<Decimal>) -> bool {
    match bos_break_level {
        None => true,
        Some(level) => level < range.low || level > range.high,
    }
}

/// Current ATR/BB-width vs. a historical baseline (an earlier 20-bar window).
/// `None` baselines mean no history is available yet.
pub fn expansion_state(
    current_atr: Decimal,
    current_bb_width: Decimal,
    hist_atr_avg: Option<Decimal>,
    hist_bb_width_avg: Option<Decimal>,
) -> ExpansionState {
    let (Some(atr_avg), Some(bb_avg)) = (hist_atr_avg, hist_bb_width_avg) else {
        return ExpansionState::Forming;
    };
    if atr_avg <= Decimal::ZERO || bb_avg <= Decimal::ZERO {
        return ExpansionState::Forming;
    }
    let atr_ratio = current_atr / atr_avg;
    let bb_ratio = current_bb_width / bb_avg;

    if atr_ratio >= dec!(1.2) || bb_ratio >= dec!(1.2) {
        ExpansionState::Expanding
    } else if atr_ratio <= dec!(0.8) || bb_ratio <= dec!(0.8) {
        ExpansionState::Contracting
    } else {
        ExpansionState::Stable
    }
}

fn strictly_contains(parent: &RangeStructure, child: &RangeStructure) -> bool {
    child.low > parent.low && child.high < parent.high
}

/// Attaches `m15` under `h1` (and `m5` under `m15`) only where strict
/// containment holds, per the nested-range hierarchy rule.
pub fn attach_nested(mut h1: RangeStructure, m15: RangeStructure, m5: Option<RangeStructure>) -> RangeStructure {
    if strictly_contains(&h1, &m15) {
        let mut m15 = m15;
        if let Some(m5) = m5 {
            if strictly_contains(&m15, &m5) {
                m15 = m15.with_nested(Timeframe::M5, m5);
            }
        }
        h1 = h1.with_nested(Timeframe::M15, m15);
    }
    h1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::range::types::{CriticalGapZones, RangeKind, TouchCount};
    use std::collections::HashMap;

    fn range(low: Decimal, high: Decimal) -> RangeStructure {
        RangeStructure {
            kind: RangeKind::Dynamic,
            high,
            low,
            mid: (low + high) / Decimal::TWO,
            width_atr: dec!(1),
            gaps: CriticalGapZones::new(high, low),
            touch_count: TouchCount::default(),
            validated: true,
            nested: HashMap::new(),
            expansion_state: ExpansionState::Stable,
            invalidation_flags: vec![],
        }
    }

    #[test]
    fn bos_inside_invalidates() {
        let r = range(dec!(95), dec!(100));
        assert!(!is_valid(&r, Some(dec!(97))));
        assert!(is_valid(&r, Some(dec!(101))));
        assert!(is_valid(&r, None));
    }

    #[test]
    fn nested_requires_strict_containment() {
        let h1 = range(dec!(90), dec!(110));
        let m15 = range(dec!(95), dec!(105));
        let attached = attach_nested(h1, m15, None);
        assert!(attached.nested_for(Timeframe::M15).is_some());

        let h1 = range(dec!(90), dec!(110));
        let m15_too_wide = range(dec!(90), dec!(110));
        let attached = attach_nested(h1, m15_too_wide, None);
        assert!(attached.nested_for(Timeframe::M15).is_none());
    }
}
