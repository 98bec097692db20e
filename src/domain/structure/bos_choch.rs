use crate::domain::structure::swings::{LabeledSwing, SwingLabel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const BOS_THRESHOLD_ATR_MULT: Decimal = dec!(0.2);

/// Break-of-structure / change-of-character, computed against the most recent
/// labeled swings and the current close.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BosChoch {
    pub bullish_bos: bool,
    pub bearish_bos: bool,
    pub bullish_choch: bool,
    pub bearish_choch: bool,
    pub break_level: Option<Decimal>,
    pub bars_since_bos: Option<usize>,
}

/// `labeled_swings` must be sorted by `idx` ascending. `current_idx` is the bar
/// index of `current_close`, used to compute `bars_since_bos`.
pub fn detect_bos_choch(
    labeled_swings: &[LabeledSwing],
    current_close: Decimal,
    current_idx: usize,
    atr: Decimal,
) -> BosChoch {
    if atr <= Decimal::ZERO {
        return BosChoch::default();
    }
    let threshold = BOS_THRESHOLD_ATR_MULT * atr;

    let last_hh = labeled_swings.iter().rev().find(|s| s.label == SwingLabel::Hh);
    let last_ll = labeled_swings.iter().rev().find(|s| s.label == SwingLabel::Ll);
    let last_lh = labeled_swings.iter().rev().find(|s| s.label == SwingLabel::Lh);
    let last_hl = labeled_swings.iter().rev().find(|s| s.label == SwingLabel::Hl);

    let mut out = BosChoch::default();

    if let Some(hh) = last_hh {
        if current_close > hh.price + threshold {
            out.bullish_bos = true;
            out.break_level = Some(hh.price);
            out.bars_since_bos = Some(current_idx.saturating_sub(hh.idx));
        }
    }
    if let Some(ll) = last_ll {
        if current_close < ll.price - threshold {
            out.bearish_bos = true;
            out.break_level = Some(ll.price);
            out.bars_since_bos = Some(current_idx.saturating_sub(ll.idx));
        }
    }

    // CHOCH: a prevailing downtrend (most recent swing label is LL/LH) breaking
    // back above the most recent lower-high, or the mirror for an uptrend.
    let downtrend = matches!(
        labeled_swings.last().map(|s| s.label),
        Some(SwingLabel::Ll) | Some(SwingLabel::Lh)
    );
    let uptrend = matches!(
        labeled_swings.last().map(|s| s.label),
        Some(SwingLabel::Hh) | Some(SwingLabel::Hl)
    );

    if downtrend {
        if let Some(lh) = last_lh {
            if current_close > lh.price + threshold {
                out.bullish_choch = true;
                out.break_level = Some(lh.price);
                out.bars_since_bos = Some(current_idx.saturating_sub(lh.idx));
            }
        }
    }
    if uptrend {
        if let Some(hl) = last_hl {
            if current_close < hl.price - threshold {
                out.bearish_choch = true;
                out.break_level = Some(hl.price);
                out.bars_since_bos = Some(current_idx.saturating_sub(hl.idx));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::structure::swings::SwingKind;

    #[test]
    fn bullish_bos_breaks_last_higher_high() {
        let swings = vec![
            LabeledSwing { idx: 2, price: dec!(100), kind: SwingKind::High, label: SwingLabel::Hh },
            LabeledSwing { idx: 5, price: dec!(95), kind: SwingKind::Low, label: SwingLabel::Hl },
        ];
        let result = detect_bos_choch(&swings, dec!(101.0), 10, dec!(2.0));
        assert!(!result.bullish_bos); // 101 < 100 + 0.4 threshold
        let result2 = detect_bos_choch(&swings, dec!(100.5), 10, dec!(2.0));
        assert!(!result2.bullish_bos);
        let result3 = detect_bos_choch(&swings, dec!(101.0), 10, dec!(1.0));
        assert!(result3.bullish_bos);
        assert_eq!(result3.break_level, Some(dec!(100)));
        assert_eq!(result3.bars_since_bos, Some(5));
    }

    #[test]
    fn no_signal_without_atr() {
        let swings = vec![];
        let result = detect_bos_choch(&swings, dec!(100), 0, Decimal::ZERO);
        assert_eq!(result, BosChoch::default());
    }

    #[test]
    fn bullish_choch_reclaims_the_last_lower_high_in_a_downtrend() {
        let swings = vec![
            LabeledSwing { idx: 0, price: dec!(110), kind: SwingKind::High, label: SwingLabel::Hh },
            LabeledSwing { idx: 2, price: dec!(105), kind: SwingKind::High, label: SwingLabel::Lh },
            LabeledSwing { idx: 4, price: dec!(98), kind: SwingKind::Low, label: SwingLabel::Ll },
        ];
        let result = detect_bos_choch(&swings, dec!(106.0), 10, dec!(1.0));
        assert!(result.bullish_choch);
        assert!(!result.bearish_choch);
        assert_eq!(result.break_level, Some(dec!(105)));
        assert_eq!(result.bars_since_bos, Some(8));
    }

    #[test]
    fn no_choch_when_the_prevailing_trend_is_still_up() {
        let swings = vec![
            LabeledSwing { idx: 0, price: dec!(90), kind: SwingKind::Low, label: SwingLabel::Hl },
            LabeledSwing { idx: 2, price: dec!(100), kind: SwingKind::High, label: SwingLabel::Hh },
        ];
        // Price dips below the last higher-low, but the trend label is still
        // Hh (uptrend), not a downtrend's lower-high, so this is a bearish
        // CHOCH candidate, not a bullish one.
        let result = detect_bos_choch(&swings, dec!(85.0), 10, dec!(1.0));
        assert!(!result.bullish_choch);
    }
}
