use super::types::VolatilityRegime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Per-timeframe weight vector, always summing to `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfWeights {
    pub h4: Decimal,
    pub h1: Decimal,
    pub m30: Decimal,
    pub m15: Decimal,
    pub m5: Decimal,
}

/// Fuses BB-width expansion (vs. its own recent history) and ADX into a
/// coarse `low | medium | high` volatility regime.
pub fn classify_volatility_regime(bb_width_ratio: Decimal, adx_h1: Decimal) -> VolatilityRegime {
    if adx_h1 > dec!(25) || bb_width_ratio >= dec!(1.2) {
        VolatilityRegime::High
    } else if adx_h1 < dec!(15) && bb_width_ratio <= dec!(0.8) {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Medium
    }
}

/// `high` volatility anchors weight to H4/H1 (the higher timeframes hold up
/// better when the lower ones whipsaw); `low` spreads weight down to M15/M5.
pub fn weights_for(regime: VolatilityRegime) -> TfWeights {
    match regime {
        VolatilityRegime::High => TfWeights { h4: dec!(0.35), h1: dec!(0.35), m30: dec!(0.15), m15: dec!(0.10), m5: dec!(0.05) },
        VolatilityRegime::Medium => TfWeights { h4: dec!(0.25), h1: dec!(0.25), m30: dec!(0.20), m15: dec!(0.15), m5: dec!(0.15) },
        VolatilityRegime::Low => TfWeights { h4: dec!(0.15), h1: dec!(0.15), m30: dec!(0.20), m15: dec!(0.25), m5: dec!(0.25) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_adx_forces_high_regime() {
        assert_eq!(classify_volatility_regime(dec!(1.0), dec!(30)), VolatilityRegime::High);
    }

    #[test]
    fn weights_sum_to_one_for_every_regime() {
        for regime in [VolatilityRegime::Low, VolatilityRegime::Medium, VolatilityRegime::High] {
            let w = weights_for(regime);
            assert_eq!(w.h4 + w.h1 + w.m30 + w.m15 + w.m5, dec!(1.0));
        }
    }
}
