use rust_decimal::Decimal;

/// Refresh PDH/PDL if the H1 ATR has moved by more than
/// `atr_change_threshold_pct` since the last refresh, or the session extreme
/// has pushed more than `session_extreme_threshold_pct` past the current
/// anchor.
pub fn should_refresh_anchors(
    atr_h1_now: Decimal,
    atr_h1_prev: Decimal,
    session_extreme: Decimal,
    current_anchor: Decimal,
    atr_change_threshold_pct: Decimal,
    session_extreme_threshold_pct: Decimal,
) -> bool {
    let atr_changed = atr_h1_prev > Decimal::ZERO && ((atr_h1_now - atr_h1_prev).abs() / atr_h1_prev) > atr_change_threshold_pct;
    let extreme_exceeded =
        current_anchor > Decimal::ZERO && ((session_extreme - current_anchor).abs() / current_anchor) > session_extreme_threshold_pct;
    atr_changed || extreme_exceeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn refreshes_on_large_atr_swing() {
        assert!(should_refresh_anchors(dec!(3), dec!(2), dec!(100), dec!(100), dec!(0.4), dec!(0.0025)));
    }

    #[test]
    fn refreshes_on_session_extreme_breach() {
        assert!(should_refresh_anchors(dec!(2), dec!(2), dec!(100.5), dec!(100), dec!(0.4), dec!(0.0025)));
    }

    #[test]
    fn stable_inputs_do_not_refresh() {
        assert!(!should_refresh_anchors(dec!(2), dec!(2), dec!(100), dec!(100), dec!(0.4), dec!(0.0025)));
    }
}
